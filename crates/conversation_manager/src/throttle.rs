use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces out rapid repeated save requests.
///
/// Branch navigation issues a lightweight write per click; clicking through
/// siblings quickly would otherwise hammer the message API. `acquire` waits
/// until at least `min_interval` has passed since the previous acquisition,
/// then stamps the new one.
pub struct SaveGate {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl SaveGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut last = self.last.lock().await;
                match *last {
                    None => {
                        *last = Some(Instant::now());
                        None
                    }
                    Some(previous) => {
                        let elapsed = previous.elapsed();
                        if elapsed >= self.min_interval {
                            *last = Some(Instant::now());
                            None
                        } else {
                            Some(self.min_interval - elapsed)
                        }
                    }
                }
            };

            match wait {
                None => return,
                Some(remaining) => tokio::time::sleep(remaining).await,
            }
        }
    }
}
