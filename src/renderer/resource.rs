//! 资源状态与常量缓冲区存储
//!
//! # 常量缓冲区布局
//!
//! 一次分配，按帧槽位划分为若干个 256 字节对齐的区域。CPU 写当前槽位的
//! 区域，GPU 可能仍在读取另一个槽位的区域，两者互不覆盖。
//!
//! ```text
//! ┌──────────────┬──────────────┐
//! │  slot 0 区域  │  slot 1 区域  │   每个区域 align_constant_size(size_of::<T>())
//! └──────────────┴──────────────┘
//! ```

use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;

use super::frame::{SlotIndex, FRAME_COUNT};
use crate::core::error::{DemoError, Result};

/// 常量缓冲区对齐要求（D3D12_CONSTANT_BUFFER_DATA_PLACEMENT_ALIGNMENT）
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

/// GPU 资源的使用状态
///
/// 只记录示例中实际出现的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// 可呈现（交换链缓冲区的初始状态）
    Present,
    /// 可作为渲染目标写入
    RenderTarget,
    /// 深度缓冲写入
    DepthWrite,
    /// 上传堆资源，GPU 只读
    GenericRead,
}

impl ResourceState {
    /// 渲染命令（clear/draw）是否可以写入处于该状态的资源
    pub fn is_writable(self) -> bool {
        matches!(self, ResourceState::RenderTarget | ResourceState::DepthWrite)
    }
}

/// 对齐到 256 字节
#[inline]
pub const fn align_constant_size(size: usize) -> usize {
    (size + CONSTANT_BUFFER_ALIGNMENT - 1) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

/// 按槽位划分的常量缓冲区布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLayout<const N: usize = FRAME_COUNT> {
    region_size: usize,
}

impl<const N: usize> UniformLayout<N> {
    /// 每个区域容纳一个 `T`
    pub fn for_type<T>() -> Self {
        Self::for_size(size_of::<T>())
    }

    pub fn for_size(size: usize) -> Self {
        Self {
            region_size: align_constant_size(size.max(1)),
        }
    }

    /// 单个区域的大小
    pub fn region_size(&self) -> usize {
        self.region_size
    }

    /// 整个分配的大小
    pub fn total_size(&self) -> usize {
        self.region_size * N
    }

    /// 槽位区域相对分配起点的偏移
    pub fn offset(&self, slot: SlotIndex<N>) -> usize {
        self.region_size * slot.get()
    }
}

/// 持久映射的常量缓冲区
///
/// 启动时映射一次，直到资源释放前才解除映射。
/// 每帧通过 [`MappedUniform::write`] 一次写入完整记录，不做部分更新。
pub struct MappedUniform<T: Copy, const N: usize = FRAME_COUNT> {
    base: NonNull<u8>,
    layout: UniformLayout<N>,
    _marker: PhantomData<T>,
}

impl<T: Copy, const N: usize> MappedUniform<T, N> {
    /// 包装映射得到的指针
    ///
    /// # Safety
    ///
    /// `base` 必须指向至少 `UniformLayout::<N>::for_type::<T>().total_size()` 字节、
    /// 在本对象存活期间保持映射且没有其他写入者的内存。
    pub unsafe fn from_raw(base: *mut u8) -> Result<Self> {
        let base = NonNull::new(base).ok_or_else(|| {
            DemoError::ResourceCreation("常量缓冲区映射返回空指针".to_string())
        })?;
        if base.as_ptr() as usize % align_of::<T>() != 0 {
            return Err(DemoError::ResourceCreation(format!(
                "常量缓冲区映射地址未按 {} 字节对齐",
                align_of::<T>()
            )));
        }
        Ok(Self {
            base,
            layout: UniformLayout::for_type::<T>(),
            _marker: PhantomData,
        })
    }

    pub fn layout(&self) -> UniformLayout<N> {
        self.layout
    }

    /// 写入槽位区域（整条记录一次写入）
    pub fn write(&mut self, slot: SlotIndex<N>, value: &T) {
        let offset = self.layout.offset(slot);
        // SAFETY: from_raw 保证区域在映射范围内，区域大小是 256 的倍数，
        // 因此每个区域的起点都满足 T 的对齐
        unsafe {
            let dst = self.base.as_ptr().add(offset).cast::<T>();
            std::ptr::write(dst, *value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C, align(256))]
    #[derive(Clone, Copy)]
    struct Block([u8; 256]);

    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Small {
        a: [f32; 4],
        b: u32,
    }

    #[test]
    fn test_align_constant_size() {
        assert_eq!(align_constant_size(1), 256);
        assert_eq!(align_constant_size(256), 256);
        assert_eq!(align_constant_size(257), 512);
        assert_eq!(align_constant_size(0), 0);
    }

    #[test]
    fn test_layout_offsets() {
        let layout = UniformLayout::<2>::for_size(300);
        assert_eq!(layout.region_size(), 512);
        assert_eq!(layout.total_size(), 1024);
        assert_eq!(layout.offset(SlotIndex::new(1).unwrap()), 512);
    }

    #[test]
    fn test_writable_states() {
        assert!(ResourceState::RenderTarget.is_writable());
        assert!(ResourceState::DepthWrite.is_writable());
        assert!(!ResourceState::Present.is_writable());
        assert!(!ResourceState::GenericRead.is_writable());
    }

    #[test]
    fn test_slots_write_separate_regions() {
        let mut storage = vec![Block([0; 256]); 2];
        let mut uniform: MappedUniform<Small> =
            unsafe { MappedUniform::from_raw(storage.as_mut_ptr().cast()) }.unwrap();

        let first = Small { a: [1.0; 4], b: 7 };
        let second = Small { a: [2.0; 4], b: 9 };
        uniform.write(SlotIndex::new(0).unwrap(), &first);
        uniform.write(SlotIndex::new(1).unwrap(), &second);

        let read = |block: &Block| unsafe { std::ptr::read(block.0.as_ptr().cast::<Small>()) };
        assert_eq!(read(&storage[0]), first);
        assert_eq!(read(&storage[1]), second);
    }

    #[test]
    fn test_null_pointer_is_rejected() {
        let result = unsafe { MappedUniform::<Small>::from_raw(std::ptr::null_mut()) };
        assert!(result.is_err());
    }
}
