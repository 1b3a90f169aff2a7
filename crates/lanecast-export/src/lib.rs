//! lanecast-export: renders a persisted lane schedule into XMLTV guides and
//! M3U playlists.
//!
//! Two rendering paths share the [`programme`] mapper and the [`deeplink`]
//! codec:
//!
//! - [`lanes`]: one channel per lane, one programme per lane entry, and a
//!   playlist whose URLs resolve per [`LaneLinkMode`]
//! - [`direct`]: one channel per playable event inside the forward horizon,
//!   with "not started" and "ended" placeholders around it

pub mod deeplink;
pub mod direct;
pub mod lanes;
pub mod m3u;
pub mod options;
pub mod programme;
pub mod xmltv;

pub use direct::{direct_channels, direct_guide, direct_playlist, DirectChannel};
pub use lanes::{lane_guide, lane_playlist, LaneLinkMode, LaneSchedule, ScheduleRow};
pub use options::RenderOptions;
pub use programme::{EventMeta, Image, Programme};
