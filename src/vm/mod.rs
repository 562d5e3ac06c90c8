//! A stack machine for the generated bytecode.
//!
//! State is an operand stack, an instruction pointer and a stack of memory
//! blocks. The bottom block is the I/O block: loading its offset 0 reads the
//! next input value and storing to its offset 1 writes an output value.
//! `INT n` pushes a block of `n` zeroed slots and `OPR 0` pops one.
//!
//! `CAL` keeps the return address on the operand stack. `OPR 0` with an empty
//! operand stack halts the machine.
//!
//! `LOD`/`STO`/`CAL` count `level` blocks down from the top of the block
//! stack, while the generator counted lexical scopes. The two agree as long
//! as every procedure runs at a call depth equal to its lexical depth, which
//! does not hold for recursive or indirectly reached procedures.

pub mod io;
mod memory;

use io::{Input, Output};
use log::{debug, trace};
use memory::{Cell, Memory};

use crate::{bytecode::{Instruction, OpCode, Operand, Operator}, error::vm::{RuntimeError, RuntimeErrorType, VmError}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
	Running,
	Halted,
}

pub struct Vm<'p, I, O> {
	program: &'p [Instruction],
	/// `None` once halted.
	ip:      Option<usize>,
	stack:   Vec<i64>,
	memory:  Memory,
	input:   I,
	output:  O,
}

impl<'p, I: Input, O: Output> Vm<'p, I, O> {
	pub fn new(program: &'p [Instruction], input: I, output: O) -> Self {
		Self { program, ip: Some(0), stack: Vec::new(), memory: Memory::default(), input, output }
	}

	/// Execute until halted.
	pub fn run(&mut self) -> Result<(), VmError> {
		let mut steps: u64 = 0;
		while self.step()? == Status::Running {
			steps += 1;
		}
		debug!("halted after {steps} instructions");
		Ok(())
	}

	/// Execute one instruction.
	pub fn step(&mut self) -> Result<Status, VmError> {
		let Some(address) = self.ip else {
			return Ok(Status::Halted);
		};
		let instruction = *self
			.program
			.get(address)
			.ok_or_else(|| RuntimeError::new(address, RuntimeErrorType::CodeAddressOutOfRange(address as i64)))?;
		trace!("{address}: {instruction} stack={:?}", self.stack);
		self.ip = Some(address + 1);
		self.execute(address, instruction)?;
		Ok(if self.ip.is_some() { Status::Running } else { Status::Halted })
	}

	pub fn is_halted(&self) -> bool { self.ip.is_none() }

	/// The operand stack, bottom first.
	pub fn stack(&self) -> &[i64] { &self.stack }

	/// Number of memory blocks, counting the I/O block.
	pub fn depth(&self) -> usize { self.memory.depth() }

	pub fn into_ports(self) -> (I, O) { (self.input, self.output) }

	fn execute(&mut self, address: usize, instruction: Instruction) -> Result<(), VmError> {
		let fault = |r#type| VmError::from(RuntimeError::new(address, r#type));
		let Instruction { op, level, offset } = instruction;
		match op {
			OpCode::Lit => {
				let value = number(offset).map_err(fault)?;
				self.stack.push(value);
			}
			OpCode::Lod => {
				let value = self.load(level, number(offset).map_err(fault)?).map_err(fault)?;
				self.stack.push(value);
			}
			OpCode::Sto => {
				let value = self.pop().map_err(fault)?;
				let offset = number(offset).map_err(fault)?;
				match self.memory.cell(level, offset).map_err(fault)? {
					Cell::Slot(slot) => *slot = value,
					Cell::Output => self.output.write(value)?,
					Cell::Input => return Err(fault(RuntimeErrorType::InvalidAddress { level, offset })),
				}
			}
			OpCode::Cal => {
				let target = self.load(level, number(offset).map_err(fault)?).map_err(fault)?;
				self.stack.push((address + 1) as i64);
				self.jump(target).map_err(fault)?;
			}
			OpCode::Int => {
				let size = usize::try_from(number(offset).map_err(fault)?)
					.map_err(|_| fault(RuntimeErrorType::InvalidOperand))?;
				self.memory.enter(size).map_err(fault)?;
			}
			OpCode::Jmp => {
				self.jump(number(offset).map_err(fault)?).map_err(fault)?;
			}
			OpCode::Jpc => {
				let condition = self.pop().map_err(fault)?;
				if condition == 0 {
					self.jump(number(offset).map_err(fault)?).map_err(fault)?;
				}
			}
			OpCode::Opr => match offset {
				Operand::Number(0) => {
					self.memory.exit().map_err(fault)?;
					match self.stack.pop() {
						Some(target) => self.jump(target).map_err(fault)?,
						None => self.ip = None,
					}
				}
				Operand::Number(_) => return Err(fault(RuntimeErrorType::InvalidOperand)),
				Operand::Operator(operator) => self.apply(operator).map_err(fault)?,
			},
		}
		Ok(())
	}

	fn load(&mut self, level: usize, offset: i64) -> Result<i64, RuntimeErrorType> {
		match self.memory.cell(level, offset)? {
			Cell::Slot(slot) => Ok(*slot),
			Cell::Input => self.input.read().ok_or(RuntimeErrorType::InputExhausted),
			Cell::Output => Err(RuntimeErrorType::InvalidAddress { level, offset }),
		}
	}

	fn jump(&mut self, target: i64) -> Result<(), RuntimeErrorType> {
		let target = usize::try_from(target).map_err(|_| RuntimeErrorType::CodeAddressOutOfRange(target))?;
		self.ip = Some(target);
		Ok(())
	}

	fn pop(&mut self) -> Result<i64, RuntimeErrorType> { self.stack.pop().ok_or(RuntimeErrorType::StackUnderflow) }

	fn apply(&mut self, operator: Operator) -> Result<(), RuntimeErrorType> {
		let result = match operator {
			Operator::Odd => i64::from(self.pop()? % 2 != 0),
			Operator::Add => self.binary(|l, r| l.checked_add(r).ok_or(RuntimeErrorType::Overflow))?,
			Operator::Sub => self.binary(|l, r| l.checked_sub(r).ok_or(RuntimeErrorType::Overflow))?,
			Operator::Mul => self.binary(|l, r| l.checked_mul(r).ok_or(RuntimeErrorType::Overflow))?,
			Operator::Div => self.binary(|l, r| match r {
				0 => Err(RuntimeErrorType::DivisionByZero),
				_ => l.checked_div(r).ok_or(RuntimeErrorType::Overflow),
			})?,
			Operator::Eq => self.binary(|l, r| Ok(i64::from(l == r)))?,
			Operator::Ne => self.binary(|l, r| Ok(i64::from(l != r)))?,
			Operator::Lt => self.binary(|l, r| Ok(i64::from(l < r)))?,
			Operator::Le => self.binary(|l, r| Ok(i64::from(l <= r)))?,
			Operator::Gt => self.binary(|l, r| Ok(i64::from(l > r)))?,
			Operator::Ge => self.binary(|l, r| Ok(i64::from(l >= r)))?,
		};
		self.stack.push(result);
		Ok(())
	}

	/// Pop the right then the left operand and combine them.
	fn binary(&mut self, f: impl FnOnce(i64, i64) -> Result<i64, RuntimeErrorType>) -> Result<i64, RuntimeErrorType> {
		let right = self.pop()?;
		let left = self.pop()?;
		f(left, right)
	}
}

fn number(operand: Operand) -> Result<i64, RuntimeErrorType> {
	match operand {
		Operand::Number(n) => Ok(n),
		Operand::Operator(_) => Err(RuntimeErrorType::InvalidOperand),
	}
}

#[cfg(test)]
mod tests {
	use std::collections::VecDeque;

	use super::*;
	use crate::{generator::Generator, parser::Parser, scanner::Scanner};

	fn compile(input: &str) -> Vec<Instruction> {
		let tokens = Scanner::scan(input).unwrap();
		let program = Parser::new(tokens).parse().unwrap();
		Generator::new().generate(&program).unwrap()
	}

	fn run(input: &str, values: &[i64]) -> Result<Vec<i64>, VmError> {
		let program = compile(input);
		let mut output = Vec::new();
		{
			let mut vm = Vm::new(&program, VecDeque::from(values.to_vec()), &mut output);
			vm.run()?;
			assert_eq!(vm.depth(), 1);
			assert!(vm.stack().is_empty());
		}
		Ok(output)
	}

	fn fault(input: &str, values: &[i64]) -> RuntimeErrorType {
		match run(input, values) {
			Err(VmError::RuntimeError(error)) => error.r#type,
			other => panic!("expected runtime error, got {other:?}"),
		}
	}

	#[test]
	fn constant_plus_one() {
		assert_eq!(run("const a = 5; var b; begin b := a + 1; write(b) end .", &[]).unwrap(), vec![6]);
	}

	#[test]
	fn read_once_write_twice() {
		assert_eq!(run("var x; begin read(x); write(x); write(x) end .", &[16]).unwrap(), vec![16, 16]);
	}

	#[test]
	fn read_exhausted() {
		assert_eq!(fault("var x, y; read(x, y) .", &[1]), RuntimeErrorType::InputExhausted);
	}

	#[test]
	fn arithmetic() {
		assert_eq!(run("write(1 + 2 * 3, (1 + 2) * 3, 7 - 2 - 1, 7 / 2, 0 - 7 / 2) .", &[]).unwrap(), vec![
			7, 9, 4, 3, -3
		]);
		assert_eq!(run("var x; begin x := 0 - 7; write(x / 2) end .", &[]).unwrap(), vec![-3]);
	}

	#[test]
	fn comparisons() {
		let program = "var a, b; begin read(a, b); if a = b then write(1); if a # b then write(2); if a < b then write(3); \
		               if a <= b then write(4); if a > b then write(5); if a >= b then write(6) end .";
		assert_eq!(run(program, &[1, 2]).unwrap(), vec![2, 3, 4]);
		assert_eq!(run(program, &[2, 2]).unwrap(), vec![1, 4, 6]);
		assert_eq!(run(program, &[3, 2]).unwrap(), vec![2, 5, 6]);
	}

	#[test]
	fn odd() {
		let program = "var x; begin read(x); if odd x then write(1) end .";
		assert_eq!(run(program, &[3]).unwrap(), vec![1]);
		assert_eq!(run(program, &[4]).unwrap(), Vec::<i64>::new());
		assert_eq!(run(program, &[-3]).unwrap(), vec![1]);
	}

	#[test]
	fn while_loop() {
		let program = "var i; begin i := 0; while i < 5 do begin i := i + 1; write(i) end end .";
		assert_eq!(run(program, &[]).unwrap(), vec![1, 2, 3, 4, 5]);
	}

	#[test]
	fn endless_loop_keeps_running() {
		let program = compile("var i; while 1 = 1 do i := i + 1 .");
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		for _ in 0..10_000 {
			assert_eq!(vm.step().unwrap(), Status::Running);
		}
		assert!(!vm.is_halted());
		assert!(vm.stack().len() <= 2);
	}

	#[test]
	fn procedure_calls() {
		let program = "var x; procedure inc; x := x + 1; begin x := 10; call inc; call inc; write(x) end .";
		assert_eq!(run(program, &[]).unwrap(), vec![12]);
	}

	#[test]
	fn sibling_and_nested_procedures() {
		let program = "var x; \
		               procedure double; x := x * 2; \
		               procedure twice; \
		                 procedure add; x := x + 3; \
		                 call add; \
		               begin x := 1; call twice; call double; write(x) end .";
		assert_eq!(run(program, &[]).unwrap(), vec![8]);
	}

	#[test]
	fn procedure_locals_are_fresh() {
		let program = "procedure p; var y; begin write(y); y := 5 end; begin call p; call p end .";
		assert_eq!(run(program, &[]).unwrap(), vec![0, 0]);
	}

	#[test]
	fn recursion_follows_lexical_levels() {
		// The recursive activation sits one block deeper than `down` is
		// nested, so `n` is looked up in the caller's empty block.
		let program = "var n; procedure down; begin write(n); n := n - 1; if n > 0 then call down end; \
		               begin n := 3; call down end .";
		let program = compile(program);
		let mut output = Vec::new();
		let mut vm = Vm::new(&program, VecDeque::new(), &mut output);
		let error = vm.run().unwrap_err();
		assert!(matches!(
			error,
			VmError::RuntimeError(RuntimeError { r#type: RuntimeErrorType::InvalidAddress { level: 1, offset: 0 }, .. })
		));
		drop(vm);
		assert_eq!(output, vec![3]);
	}

	#[test]
	fn division_by_zero() {
		assert_eq!(fault("var x; write(1 / x) .", &[]), RuntimeErrorType::DivisionByZero);
	}

	#[test]
	fn overflow() {
		assert_eq!(fault("write(9223372036854775807 + 1) .", &[]), RuntimeErrorType::Overflow);
	}

	#[test]
	fn handcrafted_faults() {
		let program = [Instruction::new(OpCode::Jmp, 0, 7)];
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		assert_eq!(vm.step().unwrap(), Status::Running);
		assert!(matches!(
			vm.step(),
			Err(VmError::RuntimeError(RuntimeError { address: 7, r#type: RuntimeErrorType::CodeAddressOutOfRange(7) }))
		));

		let program = [Instruction::operator(Operator::Add)];
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		assert!(matches!(
			vm.step(),
			Err(VmError::RuntimeError(RuntimeError { r#type: RuntimeErrorType::StackUnderflow, .. }))
		));

		let program = [Instruction::ret()];
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		assert!(matches!(
			vm.step(),
			Err(VmError::RuntimeError(RuntimeError { r#type: RuntimeErrorType::NoActiveBlock, .. }))
		));

		let program = [Instruction::new(OpCode::Opr, 0, 3)];
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		assert!(matches!(
			vm.step(),
			Err(VmError::RuntimeError(RuntimeError { r#type: RuntimeErrorType::InvalidOperand, .. }))
		));

		let program = [Instruction::operator(Operator::Odd)];
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		assert!(matches!(
			vm.step(),
			Err(VmError::RuntimeError(RuntimeError { r#type: RuntimeErrorType::StackUnderflow, .. }))
		));
	}

	#[test]
	fn huge_level_faults() {
		let program = [Instruction::new(OpCode::Int, 0, 1), Instruction::new(OpCode::Lod, usize::MAX, 0)];
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		assert_eq!(vm.step().unwrap(), Status::Running);
		assert!(matches!(
			vm.step(),
			Err(VmError::RuntimeError(RuntimeError {
				address: 1,
				r#type:  RuntimeErrorType::InvalidAddress { level: usize::MAX, offset: 0 },
			}))
		));
	}

	#[test]
	fn huge_block_faults() {
		let program = [Instruction::new(OpCode::Int, 0, i64::MAX)];
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		assert!(matches!(
			vm.step(),
			Err(VmError::RuntimeError(RuntimeError { address: 0, r#type: RuntimeErrorType::BlockTooLarge(_) }))
		));
		assert_eq!(vm.depth(), 1);
	}

	#[test]
	fn halted_machine_stays_halted() {
		let program = compile(".");
		let mut vm = Vm::new(&program, VecDeque::new(), Vec::new());
		assert_eq!(vm.step().unwrap(), Status::Running);
		assert_eq!(vm.step().unwrap(), Status::Halted);
		assert_eq!(vm.step().unwrap(), Status::Halted);
		let (_, output) = vm.into_ports();
		assert!(output.is_empty());
	}
}
