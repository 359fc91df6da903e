//! 帧槽位
//!
//! 交换链的每个后台缓冲区对应一个帧槽位，槽位拥有自己的命令分配器、
//! 常量缓冲区区域和 Fence 值。槽位只能通过 [`SlotIndex`] 访问，
//! 索引在构造时检查范围，之后的访问不会越界。

use std::ops::{Index, IndexMut};

use crate::core::error::{DemoError, Result};

/// 帧槽位数量（双缓冲）
pub const FRAME_COUNT: usize = 2;

/// 槽位索引
///
/// 只能通过 [`SlotIndex::new`] 或遍历 [`SlotIndex::all`] 得到，
/// 因此总是小于 `N`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex<const N: usize = FRAME_COUNT>(usize);

impl<const N: usize> SlotIndex<N> {
    /// 第一个槽位
    pub const FIRST: Self = Self(0);

    /// 范围外返回 `None`
    pub fn new(index: usize) -> Option<Self> {
        (index < N).then_some(Self(index))
    }

    /// 由交换链报告的后台缓冲区索引构造
    pub fn from_back_buffer(index: u32) -> Result<Self> {
        Self::new(index as usize).ok_or_else(|| {
            DemoError::Device(format!(
                "后台缓冲区索引 {} 超出槽位数量 {}",
                index, N
            ))
        })
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// 下一个槽位（循环）
    pub fn next(self) -> Self {
        Self((self.0 + 1) % N)
    }

    /// 所有槽位
    pub fn all() -> impl Iterator<Item = Self> {
        (0..N).map(Self)
    }
}

/// 按槽位索引的定长数组
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSlots<T, const N: usize = FRAME_COUNT> {
    items: [T; N],
}

impl<T, const N: usize> FrameSlots<T, N> {
    pub fn from_fn(mut f: impl FnMut(SlotIndex<N>) -> T) -> Self {
        Self {
            items: std::array::from_fn(|i| f(SlotIndex(i))),
        }
    }

    /// 逐个槽位创建，任意一个失败则整体失败
    pub fn try_from_fn(mut f: impl FnMut(SlotIndex<N>) -> Result<T>) -> Result<Self> {
        let mut items = Vec::with_capacity(N);
        for slot in SlotIndex::<N>::all() {
            items.push(f(slot)?);
        }
        let items: [T; N] = items.try_into().map_err(|_| {
            DemoError::ResourceCreation("帧槽位数量不一致".to_string())
        })?;
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex<N>, &T)> {
        self.items.iter().enumerate().map(|(i, item)| (SlotIndex(i), item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotIndex<N>, &mut T)> {
        self.items.iter_mut().enumerate().map(|(i, item)| (SlotIndex(i), item))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Default, const N: usize> Default for FrameSlots<T, N> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T, const N: usize> Index<SlotIndex<N>> for FrameSlots<T, N> {
    type Output = T;

    fn index(&self, slot: SlotIndex<N>) -> &T {
        &self.items[slot.0]
    }
}

impl<T, const N: usize> IndexMut<SlotIndex<N>> for FrameSlots<T, N> {
    fn index_mut(&mut self, slot: SlotIndex<N>) -> &mut T {
        &mut self.items[slot.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_index_range() {
        assert!(SlotIndex::<2>::new(0).is_some());
        assert!(SlotIndex::<2>::new(1).is_some());
        assert!(SlotIndex::<2>::new(2).is_none());
        assert!(matches!(
            SlotIndex::<2>::from_back_buffer(3),
            Err(DemoError::Device(_))
        ));
    }

    #[test]
    fn test_slot_index_wraps() {
        let slot = SlotIndex::<3>::FIRST;
        assert_eq!(slot.next().get(), 1);
        assert_eq!(slot.next().next().next(), slot);
    }

    #[test]
    fn test_frame_slots_indexing() {
        let mut slots: FrameSlots<u32> = FrameSlots::from_fn(|slot| slot.get() as u32 * 10);
        let second = SlotIndex::new(1).unwrap();

        assert_eq!(slots[SlotIndex::FIRST], 0);
        assert_eq!(slots[second], 10);

        slots[second] = 42;
        let collected: Vec<_> = slots.iter().map(|(s, v)| (s.get(), *v)).collect();
        assert_eq!(collected, vec![(0, 0), (1, 42)]);
    }

    #[test]
    fn test_try_from_fn_propagates_error() {
        let result: Result<FrameSlots<u32>> = FrameSlots::try_from_fn(|slot| {
            if slot.get() == 1 {
                Err(DemoError::ResourceCreation("allocator".to_string()))
            } else {
                Ok(1)
            }
        });
        assert!(result.is_err());

        let ok: FrameSlots<u32> = FrameSlots::try_from_fn(|_| Ok(7)).unwrap();
        assert!(ok.values().all(|&v| v == 7));
    }
}
