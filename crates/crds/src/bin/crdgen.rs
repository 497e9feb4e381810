//! Prints every KubeLB CustomResourceDefinition as a multi-document YAML stream.

use crds::{GlobalLoadBalancer, HTTPLoadBalancer, LoadBalancer, TCPLoadBalancer};
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crds = [
        LoadBalancer::crd(),
        TCPLoadBalancer::crd(),
        HTTPLoadBalancer::crd(),
        GlobalLoadBalancer::crd(),
    ];

    for crd in crds {
        print!("---\n{}", serde_yaml::to_string(&crd)?);
    }

    Ok(())
}
