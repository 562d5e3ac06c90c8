//! The two ports of the I/O block. The VM borrows them from its caller.

use std::{collections::VecDeque, io::Write};

use anyhow::Context;

/// Source of values for `read`.
pub trait Input {
	/// The next value, `None` once exhausted.
	fn read(&mut self) -> Option<i64>;
}

/// Sink for values passed to `write`.
pub trait Output {
	fn write(&mut self, value: i64) -> anyhow::Result<()>;
}

impl Input for VecDeque<i64> {
	fn read(&mut self) -> Option<i64> { self.pop_front() }
}

impl<T: Input + ?Sized> Input for &mut T {
	fn read(&mut self) -> Option<i64> { (**self).read() }
}

impl Output for Vec<i64> {
	fn write(&mut self, value: i64) -> anyhow::Result<()> {
		self.push(value);
		Ok(())
	}
}

impl<T: Output + ?Sized> Output for &mut T {
	fn write(&mut self, value: i64) -> anyhow::Result<()> { (**self).write(value) }
}

/// Writes each value on its own line.
pub struct LineOutput<W> {
	writer: W,
}

impl<W: Write> LineOutput<W> {
	pub fn new(writer: W) -> Self { Self { writer } }

	pub fn into_inner(self) -> W { self.writer }
}

impl<W: Write> Output for LineOutput<W> {
	fn write(&mut self, value: i64) -> anyhow::Result<()> {
		writeln!(self.writer, "{value}").context("Failed write output")?;
		self.writer.flush().context("Failed flush output")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn queue_input_is_fifo() {
		let mut input = VecDeque::from([16, 56]);
		assert_eq!(input.read(), Some(16));
		assert_eq!((&mut input).read(), Some(56));
		assert_eq!(input.read(), None);
	}

	#[test]
	fn line_output() {
		let mut output = LineOutput::new(Vec::new());
		output.write(6).unwrap();
		output.write(-1).unwrap();
		assert_eq!(output.into_inner(), b"6\n-1\n");
	}
}
