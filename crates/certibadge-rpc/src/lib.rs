//! Transport adapters for the CertiBadge gateway traits.
//!
//! Each external collaborator gets two interchangeable implementations
//! behind the same `certibadge-core` trait: an HTTP adapter for the real
//! service and a deterministic in-memory mock for tests and offline smoke
//! paths. Adapters never leak transport details upward; everything maps
//! into `GatewayError`.

pub mod abi;
pub mod ens;
pub mod ipfs;
pub mod jsonrpc;
pub mod mock;
pub mod wallet;

pub use ens::{EnsConfig, EnsResolver, ENS_REGISTRY_ADDRESS};
pub use ipfs::{ContentStoreConfig, HttpContentStore};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcClient};
pub use mock::{MockContentStore, MockNameResolver, MockWallet};
pub use wallet::{JsonRpcWallet, WalletConfig, USER_REJECTED_CODE};
