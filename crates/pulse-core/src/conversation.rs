use uuid::Uuid;

/// Canonical identifier for the conversation between two users.
///
/// Both participants must derive the same key regardless of who initiated,
/// so the pair is ordered lexicographically before joining. The result is
/// a pure function of its inputs and the sole partition key for message
/// history and unread counts.
pub fn conversation_key(a: Uuid, b: Uuid) -> String {
    let (mut first, mut second) = (a.to_string(), b.to_string());
    if second < first {
        std::mem::swap(&mut first, &mut second);
    }
    format!("{}_{}", first, second)
}
