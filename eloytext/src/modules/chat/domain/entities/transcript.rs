use serde::{Serialize, Serializer};
use std::collections::HashMap;

use super::super::value_objects::MessageId;
use super::Message;

/// 会话转录
///
/// 按插入顺序保存消息，并支持按 ID 的原地更新与删除。
/// `order` 与 `messages` 始终包含同一组 ID。
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    order: Vec<MessageId>,
    messages: HashMap<MessageId, Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加消息；ID 已存在时拒绝并返回 false
    pub fn push(&mut self, message: Message) -> bool {
        let id = message.id();
        if self.messages.contains_key(&id) {
            return false;
        }
        self.order.push(id);
        self.messages.insert(id, message);
        true
    }

    /// 按 ID 原地更新，不改变顺序
    pub fn update<F>(&mut self, id: MessageId, f: F) -> Option<&Message>
    where
        F: FnOnce(&mut Message),
    {
        let message = self.messages.get_mut(&id)?;
        f(message);
        Some(message)
    }

    /// 按 ID 删除
    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let removed = self.messages.remove(&id)?;
        self.order.retain(|existing| *existing != id);
        Some(removed)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.messages.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Message> + '_ {
        self.order.iter().filter_map(|id| self.messages.get(id))
    }

    pub fn last(&self) -> Option<&Message> {
        self.order.last().and_then(|id| self.messages.get(id))
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.iter().cloned().collect()
    }
}

impl Serialize for Transcript {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut transcript = Transcript::new();
        for i in 0..5 {
            transcript.push(Message::new_user(format!("Message {}", i)));
        }

        let texts: Vec<&str> = transcript.iter().map(|m| m.text()).collect();
        assert_eq!(
            texts,
            vec!["Message 0", "Message 1", "Message 2", "Message 3", "Message 4"]
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut transcript = Transcript::new();
        let msg = Message::new_user("Hi");

        assert!(transcript.push(msg.clone()));
        assert!(!transcript.push(msg));
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut transcript = Transcript::new();
        let first = Message::new_user("first");
        let second = Message::new_assistant("sec");
        let third = Message::new_user("third");
        let second_id = second.id();
        transcript.push(first);
        transcript.push(second);
        transcript.push(third);

        transcript.update(second_id, |m| m.append_text("ond"));

        let texts: Vec<&str> = transcript.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_update_missing_id() {
        let mut transcript = Transcript::new();
        assert!(transcript.update(MessageId::new(), |m| m.append_text("x")).is_none());
    }

    #[test]
    fn test_remove_middle() {
        let mut transcript = Transcript::new();
        let a = Message::new_user("a");
        let b = Message::placeholder("b");
        let c = Message::new_user("c");
        let b_id = b.id();
        transcript.push(a);
        transcript.push(b);
        transcript.push(c);

        let removed = transcript.remove(b_id).unwrap();
        assert_eq!(removed.text(), "b");
        assert!(!transcript.contains(b_id));

        let texts: Vec<&str> = transcript.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["a", "c"]);
        assert_eq!(transcript.last().unwrap().text(), "c");
    }

    #[test]
    fn test_serializes_as_ordered_list() {
        let mut transcript = Transcript::new();
        transcript.push(Message::new_user("one"));
        transcript.push(Message::new_assistant("two"));

        let value = serde_json::to_value(&transcript).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["text"], "one");
        assert_eq!(items[1]["role"], "assistant");
    }
}
