use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, TryLockError};

/// 互斥锁
///
/// 对 `std::sync::Mutex` 的薄封装：
/// - `acquire` 阻塞直到获得所有权，返回的 [`AutoLock`] 析构时释放
/// - `try_acquire` 不阻塞，锁被占用时返回 `None`
/// - 持锁线程 panic 导致的中毒状态会被直接忽略，日志路径不能因此失效
///
/// 不支持重入：同一线程在持有锁时再次 `acquire` 会死锁，
/// 持有锁时调用 `try_acquire` 的结果未定义。
#[derive(Debug, Default)]
pub struct Lock<T = ()> {
    inner: Mutex<T>,
}

impl<T> Lock<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// 阻塞获取锁
    pub fn acquire(&self) -> AutoLock<'_, T> {
        let guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        AutoLock { guard }
    }

    /// 尝试获取锁，锁已被其他线程持有时立即返回 `None`
    pub fn try_acquire(&self) -> Option<AutoLock<'_, T>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(AutoLock { guard }),
            Err(TryLockError::Poisoned(poisoned)) => Some(AutoLock {
                guard: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 作用域锁
///
/// 构造时已持有锁，任何退出路径（包括提前返回和 panic）析构时都会释放
pub struct AutoLock<'a, T = ()> {
    guard: MutexGuard<'a, T>,
}

impl<T> AutoLock<'_, T> {
    /// 显式释放锁，等价于 drop
    pub fn release(self) {}
}

impl<T> Deref for AutoLock<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for AutoLock<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
