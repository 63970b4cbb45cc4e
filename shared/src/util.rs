/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a fresh string id for a row (uuid v4).
///
/// All domain tables key on uuid strings so ids can be minted inside
/// an open transaction without a round-trip to the database.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
