//! Real-Debrid provider
//!
//! [`RealDebridClient`] holds the mapping and policy logic; the wire protocol
//! lives behind [`RealDebridApi`], with [`HttpRealDebridApi`] as the REST
//! implementation.

pub mod api;
pub mod client;
pub mod http;

#[cfg(test)]
pub mod test_mocks;

pub use api::{
    AccountInfo, AddedTorrent, ApiConnector, RealDebridApi, TorrentInfo, TorrentInfoFile,
    UnrestrictedLink,
};
pub use client::{RealDebridClient, TORRENT_PAGE_SIZE};
pub use http::{HttpConnector, HttpRealDebridApi, error_from_response, parse_server_time};
