use super::message::Message;
use super::prompts::SYSTEM_PROMPT;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One conversation. The history always starts with exactly one system
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    thread_id: String,
    history: Vec<Message>,
}

impl Thread {
    pub fn new(thread_id: impl Into<String>, system_prompt: &str) -> Self {
        Self {
            thread_id: thread_id.into(),
            history: vec![Message::system(system_prompt)],
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn append<I>(&mut self, messages: I)
    where
        I: IntoIterator<Item = Message>,
    {
        self.history.extend(
            messages
                .into_iter()
                .filter(|message| !matches!(message, Message::System { .. })),
        );
    }
}

pub type ThreadHandle = Arc<Mutex<Thread>>;

/// Process-wide thread histories keyed by id. Constructed once and shared by
/// reference; entries are never evicted.
///
/// Each thread sits behind its own mutex. Holding a thread's lock for a whole
/// turn serializes turns on that thread while other threads proceed.
#[derive(Debug)]
pub struct ThreadStore {
    system_prompt: String,
    threads: Mutex<HashMap<String, ThreadHandle>>,
}

impl Default for ThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadStore {
    pub fn new() -> Self {
        Self::with_system_prompt(SYSTEM_PROMPT)
    }

    pub fn with_system_prompt(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            threads: Mutex::new(HashMap::new()),
        }
    }

    fn threads(&self) -> MutexGuard<'_, HashMap<String, ThreadHandle>> {
        self.threads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Existing thread for `thread_id`, or a new one seeded with the system
    /// prompt.
    pub fn resolve(&self, thread_id: &str) -> ThreadHandle {
        let mut threads = self.threads();
        let handle = threads
            .entry(thread_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Thread::new(thread_id, &self.system_prompt))));
        Arc::clone(handle)
    }

    pub fn append(&self, thread_id: &str, messages: Vec<Message>) {
        let handle = self.resolve(thread_id);
        lock_thread(&handle).append(messages);
    }

    pub fn snapshot(&self, thread_id: &str) -> Option<Vec<Message>> {
        let handle = self.threads().get(thread_id).map(Arc::clone)?;
        let thread = lock_thread(&handle);
        Some(thread.history().to_vec())
    }

    pub fn len(&self) -> usize {
        self.threads().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Locks one thread. A lock poisoned by a panicking turn is recovered: turns
/// only append after they succeed, so the history behind it is intact.
pub fn lock_thread(handle: &ThreadHandle) -> MutexGuard<'_, Thread> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_seeds_one_system_message() {
        let store = ThreadStore::with_system_prompt("system");
        store.resolve("t1");
        store.append("t1", vec![Message::user("hi"), Message::system("again")]);
        store.resolve("t1");

        let history = store.snapshot("t1").expect("thread");
        assert_eq!(history, vec![Message::system("system"), Message::user("hi")]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshot_of_unknown_thread_is_none() {
        let store = ThreadStore::new();
        assert_eq!(store.snapshot("missing"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn poisoned_thread_lock_is_recovered_with_history_intact() {
        let store = ThreadStore::with_system_prompt("system");
        store.append("t1", vec![Message::user("hi")]);
        let handle = store.resolve("t1");

        let poisoner = Arc::clone(&handle);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("turn panicked while holding the thread");
        })
        .join();
        assert!(handle.is_poisoned());

        store.append("t1", vec![Message::user("again")]);
        assert_eq!(
            store.snapshot("t1").expect("thread"),
            vec![
                Message::system("system"),
                Message::user("hi"),
                Message::user("again")
            ]
        );
    }
}
