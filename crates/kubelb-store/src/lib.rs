//! Object store abstraction for KubeLB controllers
//!
//! The reconcilers never talk to `kube::Api` directly. They go through the
//! [`ObjectStore`] trait so the same logic runs against a live cluster
//! ([`KubeStore`]) or an in-memory fake ([`MockStore`], behind the
//! `test-util` feature).
//!
//! # Example
//!
//! ```no_run
//! use k8s_openapi::api::core::v1::Service;
//! use kubelb_store::{KubeStore, ObjectStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let services: KubeStore<Service> = KubeStore::new(client);
//!
//! match services.get("default", "web").await {
//!     Ok(service) => println!("found {:?}", service.metadata.uid),
//!     Err(e) if e.is_not_found() => println!("not there yet"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeStore;
pub use error::StoreError;
pub use store_trait::{object_key, ObjectStore};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{Failure, MockStore, Operation, WriteOp};
