//! Database module exports.

pub mod afk;
pub mod antiflood;
pub mod blacklist;
pub mod common;
pub mod disabled;
pub mod filter;
pub mod locks;
pub mod log_channel;
pub mod notes;
pub mod reporting;
pub mod rss;
pub mod rules;
pub mod safemode;
pub mod sanction;
pub mod user;
pub mod userinfo;
pub mod warn;
pub mod welcome;

pub use afk::AfkUser;
pub use antiflood::FloodControl;
pub use blacklist::BlacklistTrigger;
pub use common::{InlineButton, MessageKind};
pub use disabled::DisabledCommand;
pub use filter::{CustomFilter, FilterButton};
pub use locks::{ChatPermissions, ChatRestrictions, LockType, RestrictionType};
pub use log_channel::LogChannel;
pub use notes::{Note, NoteButton};
pub use reporting::{ChatReportSetting, UserReportSetting};
pub use rss::RssFeed;
pub use rules::ChatRules;
pub use safemode::SafeMode;
pub use sanction::{SanctionSetting, SanctionedUser};
pub use user::{ChatMember, TgChat, TgUser};
pub use userinfo::{UserBio, UserInfo};
pub use warn::{UserWarns, WarnFilter, WarnSettings};
pub use welcome::{GreetingButton, WelcomePrefs};
