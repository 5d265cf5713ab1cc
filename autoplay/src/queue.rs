use crate::intf::Lobby;
use tracing::{info, warn};

pub const MAX_ATTEMPTS: u32 = 10;

/// Starts a new game once the current one is over.
///
/// The page path of the finished game is remembered, and a new game is
/// requested on every call while still on that path. After more than
/// [`MAX_ATTEMPTS`] failed requests the state is reset, so the next call
/// starts over.
#[derive(Debug, Default)]
pub struct AutoQueue {
    game_path: Option<String>,
    attempts: u32,
}

impl AutoQueue {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn join_game(&mut self, lobby: &mut impl Lobby) {
        if lobby.game_over() != Some(true) {
            return;
        }
        let path = lobby.path();
        match &self.game_path {
            None => {
                self.game_path = Some(path.clone());
                self.attempts = 0;
            }
            Some(p) if *p != path => self.game_path = None,
            Some(_) => {}
        }
        if self.game_path.as_deref() != Some(path.as_str()) {
            return;
        }
        match lobby.request_new_game() {
            Ok(()) => info!(path = path.as_str(), "joining a game"),
            Err(e) => {
                warn!(path = path.as_str(), attempts = self.attempts, error = %e, "could not join a game");
                if self.attempts > MAX_ATTEMPTS {
                    self.game_path = None;
                    self.attempts = 0;
                } else {
                    self.attempts += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};

    struct FakeLobby {
        over: Option<bool>,
        path: String,
        fail: bool,
        requests: usize,
    }

    impl FakeLobby {
        fn new(over: Option<bool>, fail: bool) -> Self {
            FakeLobby {
                over,
                path: "/game/live/1".into(),
                fail,
                requests: 0,
            }
        }
    }

    impl Lobby for FakeLobby {
        fn game_over(&self) -> Option<bool> {
            self.over
        }

        fn path(&self) -> String {
            self.path.clone()
        }

        fn request_new_game(&mut self) -> Result<()> {
            self.requests += 1;
            if self.fail {
                bail!("new game button not found");
            }
            Ok(())
        }
    }

    #[test]
    fn test_game_not_over() {
        let mut queue = AutoQueue::new();
        let mut lobby = FakeLobby::new(None, false);
        queue.join_game(&mut lobby);
        lobby.over = Some(false);
        queue.join_game(&mut lobby);
        assert_eq!(lobby.requests, 0);
    }

    #[test]
    fn test_join() {
        let mut queue = AutoQueue::new();
        let mut lobby = FakeLobby::new(Some(true), false);
        queue.join_game(&mut lobby);
        assert_eq!(lobby.requests, 1);
        assert_eq!(queue.attempts(), 0);
    }

    #[test]
    fn test_path_change_resets() {
        let mut queue = AutoQueue::new();
        let mut lobby = FakeLobby::new(Some(true), true);
        queue.join_game(&mut lobby);
        queue.join_game(&mut lobby);
        assert_eq!(queue.attempts(), 2);

        lobby.path = "/game/live/2".into();
        queue.join_game(&mut lobby);
        assert_eq!(lobby.requests, 2);
        queue.join_game(&mut lobby);
        assert_eq!(lobby.requests, 3);
        assert_eq!(queue.attempts(), 1);
    }

    #[test]
    fn test_reset_after_failures() {
        let mut queue = AutoQueue::new();
        let mut lobby = FakeLobby::new(Some(true), true);
        for _ in 0..=MAX_ATTEMPTS {
            queue.join_game(&mut lobby);
        }
        assert_eq!(queue.attempts(), MAX_ATTEMPTS + 1);
        queue.join_game(&mut lobby);
        assert_eq!(queue.attempts(), 0);
        assert_eq!(lobby.requests, MAX_ATTEMPTS as usize + 2);

        // A fresh cycle on the same page.
        queue.join_game(&mut lobby);
        assert_eq!(queue.attempts(), 1);
    }
}
