//! # onebot
//!
//! OneBot v11 HTTP adapter for the history crawler.
//!
//! - [`OneBotPageFetcher`] implements [`portrayal_core::PageFetcher`] via `get_group_msg_history`
//! - [`OneBotProfileLookup`] implements [`portrayal_core::ProfileLookup`] via
//!   `get_group_member_info`
//!
//! Both share one [`OneBotClient`]; transport, HTTP and `retcode` failures all map to
//! [`portrayal_core::FetchError`]. No retries happen here.

mod client;
mod config;
mod history;
mod profile;
mod wire;

pub use client::OneBotClient;
pub use config::{OneBotConfig, DEFAULT_API_URL};
pub use history::{OneBotPageFetcher, GET_GROUP_MSG_HISTORY};
pub use profile::{OneBotProfileLookup, GET_GROUP_MEMBER_INFO};
