use campus_poll::ReadFailure;

/// 单个组件的数据状态
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot<T> {
    /// 尚无数据，显示骨架屏
    #[default]
    Loading,
    Ready(T),
    /// 显示内联错误信息
    Failed(String),
}

impl<T> Slot<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Slot::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Slot::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// 失败时保留已有数据，没有数据则继续显示骨架屏
    pub fn settle_or_keep(&mut self, result: Result<T, &ReadFailure>) {
        match result {
            Ok(value) => *self = Slot::Ready(value),
            Err(_) => {
                if !matches!(self, Slot::Ready(_)) {
                    *self = Slot::Loading;
                }
            }
        }
    }

    /// 失败时显示固定的错误信息
    pub fn settle_or_fail(&mut self, result: Result<T, &ReadFailure>, message: &str) {
        *self = match result {
            Ok(value) => Slot::Ready(value),
            Err(_) => Slot::Failed(message.to_string()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> ReadFailure {
        ReadFailure {
            read: "metrics".to_string(),
            message: "HTTP 502".to_string(),
        }
    }

    #[test]
    fn test_settle_or_keep() {
        let mut slot: Slot<u32> = Slot::default();
        slot.settle_or_keep(Err(&failure()));
        assert!(slot.is_loading());

        slot.settle_or_keep(Ok(4));
        assert_eq!(slot.value(), Some(&4));

        slot.settle_or_keep(Err(&failure()));
        assert_eq!(slot.value(), Some(&4));
    }

    #[test]
    fn test_settle_or_fail() {
        let mut slot: Slot<u32> = Slot::Ready(1);
        slot.settle_or_fail(Err(&failure()), "Failed to load device status.");
        assert_eq!(slot.error(), Some("Failed to load device status."));

        slot.settle_or_fail(Ok(2), "unused");
        assert_eq!(slot, Slot::Ready(2));
    }
}
