pub mod messages;
pub mod test_util;
