use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// 协作式取消标记：Ctrl+C 处理器置位，倒计时、步骤之间以及每次等待时检查。
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 注册 Ctrl+C 处理器，进程内只能调用一次。
    pub fn install_ctrlc(&self) -> Result<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            println!("\nCancelled by user");
            token.cancel();
        })?;
        Ok(())
    }
}

/// 阻塞等待的抽象，便于测试中记录时长而不真正休眠。
pub trait Clock {
    /// 等待 `duration`；若期间被取消则提前返回 `false`。
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> bool;
}

/// 真实时钟：切片休眠，每 100ms 检查一次取消标记。
pub struct SystemClock;

const SLICE: Duration = Duration::from_millis(100);

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if cancel.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(SLICE));
        }
    }
}
