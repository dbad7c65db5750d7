pub mod aggregate;

pub use aggregate::{Member, MemberDraft, MemberId, SUMMARY_MEMBER_TYPES};
