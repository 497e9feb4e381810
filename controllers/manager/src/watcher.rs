//! Kubernetes resource watchers.
//!
//! Legacy ingress kinds each run a `kube_runtime` controller that also owns
//! the generated Services and Endpoints, so drift on those re-triggers the
//! owner. LoadBalancers are watched with a plain watcher stream: deletions
//! have to reach the snapshot as well.

use crate::error::ControllerError;
use crate::reconciler::LegacyReconciler;
use crate::snapshot::SnapshotReconciler;
use crds::LoadBalancer;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::{Endpoints, Service};
use kube::{Api, Resource, ResourceExt};
use kube_runtime::controller::{self, Action};
use kube_runtime::{watcher, Controller, WatchStreamExt};
use kubelb::{BackoffTracker, IngressResource};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::pin::pin;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared state handed to every legacy reconcile.
pub struct Context {
    pub reconciler: LegacyReconciler,
    pub backoff: BackoffTracker,
}

fn key_of<K: Resource<DynamicType = ()>>(resource: &K) -> String {
    ingress_key(
        &K::kind(&()),
        &resource.namespace().unwrap_or_default(),
        &resource.name_any(),
    )
}

fn ingress_key(kind: &str, namespace: &str, name: &str) -> String {
    format!("{kind}/{namespace}/{name}")
}

/// Drops the backoff of an ingress resource that left the controller's store.
fn forget_missing(
    backoff: &BackoffTracker,
    kind: &str,
    error: &controller::Error<ControllerError, watcher::Error>,
) -> bool {
    match error {
        controller::Error::ObjectNotFound(object) => {
            let key = ingress_key(kind, object.namespace.as_deref().unwrap_or_default(), &object.name);
            debug!("{} is gone, dropping its backoff", key);
            backoff.reset(&key);
            true
        }
        _ => false,
    }
}

async fn reconcile_ingress<K>(resource: Arc<K>, ctx: Arc<Context>) -> Result<Action, ControllerError>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
    IngressResource: From<K>,
{
    let ingress = IngressResource::from(resource.as_ref().clone());
    ctx.reconciler.handle_l4(&ingress).await?;
    ctx.backoff.reset(&key_of(resource.as_ref()));
    Ok(Action::await_change())
}

fn error_policy<K>(resource: Arc<K>, error: &ControllerError, ctx: Arc<Context>) -> Action
where
    K: Resource<DynamicType = ()>,
{
    let key = key_of(resource.as_ref());
    let delay = ctx.backoff.next_for(&key);
    warn!("Failed to reconcile {}: {}, requeue in {:?}", key, error, delay);
    Action::requeue(delay)
}

/// Api handle scoped to the watched namespace, or cluster-wide.
pub fn scoped_api<K>(client: kube::Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = k8s_openapi::NamespaceResourceScope>,
    K::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    }
}

/// Watches legacy ingress resources and LoadBalancers.
pub struct Watcher {
    context: Arc<Context>,
    snapshots: Arc<SnapshotReconciler>,
    client: kube::Client,
    namespace: Option<String>,
    concurrency: u16,
}

impl Watcher {
    pub fn new(
        context: Arc<Context>,
        snapshots: Arc<SnapshotReconciler>,
        client: kube::Client,
        namespace: Option<String>,
        concurrency: u16,
    ) -> Self {
        Self {
            context,
            snapshots,
            client,
            namespace,
            concurrency,
        }
    }

    /// Runs the controller for one legacy ingress kind until shutdown.
    pub async fn watch_ingress<K>(&self) -> Result<(), ControllerError>
    where
        K: Resource<DynamicType = (), Scope = k8s_openapi::NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + Debug
            + Send
            + Sync
            + 'static,
        IngressResource: From<K>,
    {
        let kind = K::kind(&()).to_string();
        info!("Starting {} watcher", kind);

        let namespace = self.namespace.as_deref();
        Controller::new(scoped_api::<K>(self.client.clone(), namespace), watcher::Config::default())
            .owns(scoped_api::<Service>(self.client.clone(), namespace), watcher::Config::default())
            .owns(scoped_api::<Endpoints>(self.client.clone(), namespace), watcher::Config::default())
            .with_config(controller::Config::default().concurrency(self.concurrency))
            .shutdown_on_signal()
            .run(reconcile_ingress::<K>, error_policy::<K>, Arc::clone(&self.context))
            .for_each(|result| {
                let kind = kind.clone();
                let context = Arc::clone(&self.context);
                async move {
                    match result {
                        Ok((object, _)) => debug!("Reconciled {} {}", kind, object),
                        Err(e) if forget_missing(&context.backoff, &kind, &e) => {}
                        Err(e) => error!("{} controller error: {}", kind, e),
                    }
                }
            })
            .await;

        info!("{} watcher stopped", kind);
        Ok(())
    }

    /// Starts watching LoadBalancer resources for the data-plane snapshot.
    pub async fn watch_load_balancers(&self) -> Result<(), ControllerError> {
        info!("Starting LoadBalancer watcher");

        let api = scoped_api::<LoadBalancer>(self.client.clone(), self.namespace.as_deref());
        let stream = watcher(api, watcher::Config::default()).default_backoff();
        apply_load_balancer_events(stream, &self.snapshots).await;

        info!("LoadBalancer watcher stopped");
        Ok(())
    }
}

/// Feeds LoadBalancer watch events into the snapshot until the stream ends.
///
/// Stream errors are logged and skipped; the watcher relists on its own.
pub async fn apply_load_balancer_events<S>(stream: S, snapshots: &SnapshotReconciler)
where
    S: Stream<Item = Result<watcher::Event<LoadBalancer>, watcher::Error>>,
{
    let mut stream = pin!(stream);
    let mut initial = BTreeSet::new();

    while let Some(item) = stream.next().await {
        let event = match item {
            Ok(event) => event,
            Err(e) => {
                warn!("LoadBalancer watch error: {}", e);
                continue;
            }
        };
        match event {
            watcher::Event::Apply(lb) | watcher::Event::Delete(lb) => {
                let namespace = lb.namespace().unwrap_or_default();
                debug!("LoadBalancer changed: {}/{}", namespace, lb.name_any());
                push_snapshot(snapshots, &namespace).await;
            }
            watcher::Event::Init => {
                debug!("LoadBalancer watcher initialized");
                initial.clear();
            }
            watcher::Event::InitApply(lb) => {
                initial.insert(lb.namespace().unwrap_or_default());
            }
            watcher::Event::InitDone => {
                info!("LoadBalancer watcher initialization complete");
                for namespace in std::mem::take(&mut initial) {
                    push_snapshot(snapshots, &namespace).await;
                }
            }
        }
    }
}

async fn push_snapshot(snapshots: &SnapshotReconciler, namespace: &str) {
    if let Err(e) = snapshots.reconcile_namespace(namespace).await {
        error!("Failed to update snapshot for {}: {}", namespace, e);
    }
}
