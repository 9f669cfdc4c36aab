/// Admin class each follower registers an instance of to announce itself
pub const NODE_CLASS: &str = "node";
pub const NODE_NAME_ATTRIBUTE: &str = "name";

/// Admin class the leader registers to broadcast the session id
pub const FEDEX_CLASS: &str = "fedexID";
pub const FEDEX_TS_ATTRIBUTE: &str = "ts";

/// Zero lookahead: updates may carry the granted time itself
pub const LOOKAHEAD: f64 = 0.0;
