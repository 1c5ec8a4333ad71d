//! Outbound command queue
//!
//! Replies carry no request identifier, so they are attributed by position:
//! the head of the queue is the only command ever in flight. The queue is
//! only appended to and popped from the front, never reordered.

use std::collections::VecDeque;
use std::time::Instant;

use kaleido_api::{Command, CommandKind};

/// A queued command and when it was last written out
#[derive(Debug, Clone)]
pub struct QueuedCommand {
    pub command: Command,
    pub sent_at: Option<Instant>,
}

/// FIFO of outstanding commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    entries: VecDeque<QueuedCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail, returning whether the queue was empty before
    pub fn push(&mut self, command: Command) -> bool {
        let was_empty = self.entries.is_empty();
        self.entries.push_back(QueuedCommand {
            command,
            sent_at: None,
        });
        was_empty
    }

    pub fn head(&self) -> Option<&QueuedCommand> {
        self.entries.front()
    }

    pub(crate) fn head_mut(&mut self) -> Option<&mut QueuedCommand> {
        self.entries.front_mut()
    }

    /// Remove the resolved head
    pub fn pop(&mut self) -> Option<QueuedCommand> {
        self.entries.pop_front()
    }

    /// Empty the queue, returning the commands in order
    pub fn drain(&mut self) -> Vec<Command> {
        self.entries.drain(..).map(|entry| entry.command).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.entries.iter().map(|entry| &entry.command)
    }
}

/// Expand a command into what must actually be queued.
///
/// A set-layout that belongs to a room needs that room's context open while
/// it runs, so it becomes open, set, close. The room comes from the kind, so
/// an inline `ROOM/layout` id and [`Command::set_layout_in_room`] behave the
/// same. The returned set is queued as is and never expanded again.
pub fn expand(command: Command) -> Vec<Command> {
    let CommandKind::SetLayout {
        layout,
        room: Some(room),
    } = command.kind()
    else {
        return vec![command];
    };

    let room = room.clone();
    let name = match command.room_qualified() {
        Some((prefix, name)) if prefix == room => name.to_string(),
        _ => layout.clone(),
    };

    match Command::set_layout_in_room(&room, &name) {
        Ok(set) => vec![Command::open_room(&room), set, Command::close()],
        // An empty name after the room prefix; let the device reject it as sent
        Err(_) => vec![command],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaleido_api::RoomId;

    #[test]
    fn test_push_reports_empty() {
        let mut queue = CommandQueue::new();
        assert!(queue.push(Command::get_room_list()));
        assert!(!queue.push(Command::get_layout_list()));
        assert_eq!(queue.len(), 2);

        let head = queue.pop().unwrap();
        assert_eq!(head.command, Command::get_room_list());
        assert_eq!(queue.head().unwrap().command, Command::get_layout_list());
    }

    #[test]
    fn test_drain_keeps_order() {
        let mut queue = CommandQueue::new();
        queue.push(Command::close());
        queue.push(Command::get_current_layout());
        assert_eq!(
            queue.drain(),
            vec![Command::close(), Command::get_current_layout()]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_expand_room_qualified_layout() {
        let expanded = expand(Command::set_layout("ROOM1/Layout1.kg2").unwrap());
        let texts: Vec<_> = expanded.iter().map(|c| c.text()).collect();
        assert_eq!(
            texts,
            vec![
                "<openID>ROOM1</openID>",
                "<setKCurrentLayout>set Layout1.kg2</setKCurrentLayout>",
                "<closeID/>",
            ]
        );
        assert_eq!(
            expanded[1].kind(),
            &CommandKind::SetLayout {
                layout: "Layout1.kg2".to_string(),
                room: Some(RoomId::new("ROOM1")),
            }
        );
    }

    #[test]
    fn test_expand_layout_for_named_room() {
        let room = RoomId::new("ROOM1");
        let expanded = expand(Command::set_layout_in_room(&room, "Quad.kg2").unwrap());
        assert_eq!(
            expanded,
            vec![
                Command::open_room(&room),
                Command::set_layout_in_room(&room, "Quad.kg2").unwrap(),
                Command::close(),
            ]
        );
    }

    #[test]
    fn test_expand_leaves_other_commands() {
        let set = Command::set_layout("Layout1.kg2").unwrap();
        assert_eq!(expand(set.clone()), vec![set]);
        assert_eq!(expand(Command::close()), vec![Command::close()]);

        let raw = Command::raw("<setKCurrentLayout>set ROOM1/</setKCurrentLayout>");
        assert_eq!(expand(raw.clone()), vec![raw]);
    }
}
