use crate::error::vm::RuntimeErrorType;

/// Largest number of slots a single `INT` may open.
pub(super) const MAX_BLOCK_SIZE: usize = 1 << 20;

/// A resolved slot of the block stack.
pub(super) enum Cell<'a> {
	/// Offset 0 of the I/O block.
	Input,
	/// Offset 1 of the I/O block.
	Output,
	Slot(&'a mut i64),
}

/// The stack of activation blocks sitting on the fixed I/O block.
#[derive(Debug, Default)]
pub(super) struct Memory {
	/// Data blocks, innermost last. The I/O block is implicit below them.
	blocks: Vec<Vec<i64>>,
}

impl Memory {
	/// Number of blocks including the I/O block.
	pub fn depth(&self) -> usize { self.blocks.len() + 1 }

	/// Push a zero-filled block of `size` slots.
	pub fn enter(&mut self, size: usize) -> Result<(), RuntimeErrorType> {
		if size > MAX_BLOCK_SIZE {
			return Err(RuntimeErrorType::BlockTooLarge(size));
		}
		let mut block = Vec::new();
		block.try_reserve_exact(size).map_err(|_| RuntimeErrorType::BlockTooLarge(size))?;
		block.resize(size, 0);
		self.blocks.push(block);
		Ok(())
	}

	pub fn exit(&mut self) -> Result<(), RuntimeErrorType> {
		self.blocks.pop().map(|_| ()).ok_or(RuntimeErrorType::NoActiveBlock)
	}

	/// Find the cell `level` blocks below the top, at `offset`.
	pub fn cell(&mut self, level: usize, offset: i64) -> Result<Cell<'_>, RuntimeErrorType> {
		let invalid = RuntimeErrorType::InvalidAddress { level, offset };
		let depth = self.blocks.len();
		if level == depth {
			return match offset {
				0 => Ok(Cell::Input),
				1 => Ok(Cell::Output),
				_ => Err(invalid),
			};
		}
		let index = level.checked_add(1).and_then(|level| depth.checked_sub(level)).ok_or_else(|| invalid.clone())?;
		let slot = usize::try_from(offset).map_err(|_| invalid.clone())?;
		self.blocks[index].get_mut(slot).map(Cell::Slot).ok_or(invalid)
	}
}
