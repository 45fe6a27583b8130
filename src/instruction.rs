//! Instruction representation and decoding

use crate::error::DecodeError;

/// Operation kind, one variant per recognized keyword
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    // Register-register arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // Register-immediate arithmetic
    AddI,
    SubI,
    MulI,
    DivI,
    // Memory
    Load,
    Store,
    // Branches
    Jump,
    Beqz,
    Bnez,
}

impl Opcode {
    fn from_keyword(keyword: &str) -> Option<Self> {
        use Opcode::*;
        match keyword {
            "ADD" => Some(Add),
            "SUB" => Some(Sub),
            "MUL" => Some(Mul),
            "DIV" => Some(Div),
            "ADDI" => Some(AddI),
            "SUBI" => Some(SubI),
            "MULI" => Some(MulI),
            "DIVI" => Some(DivI),
            "LOAD" => Some(Load),
            "STORE" => Some(Store),
            "JUMP" => Some(Jump),
            "BEQZ" => Some(Beqz),
            "BNEZ" => Some(Bnez),
            _ => None,
        }
    }

    /// True for the branch variants (no register destination, resolve
    /// by redirecting the program index)
    pub fn is_branch(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::Beqz | Opcode::Bnez)
    }

    /// True for LOAD/STORE
    pub fn is_memory(self) -> bool {
        matches!(self, Opcode::Load | Opcode::Store)
    }
}

/// Decoded instruction.
///
/// Immutable once decoded; the progressively filled operand state
/// (Vj/Vk) lives in the reservation station, not here.
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    /// Original textual form, kept for the observation surface
    pub text: String,
    /// Tagged operation
    pub opcode: Opcode,
    /// Destination register (absent for store/branch)
    pub dest: Option<String>,
    /// Source register 1 (store: the stored register; BEQZ/BNEZ: the
    /// tested register)
    pub src1: Option<String>,
    /// Source register 2 (register-register arithmetic only)
    pub src2: Option<String>,
    /// Immediate literal (register-immediate arithmetic) or memory offset
    pub imm: Option<i64>,
    /// Memory base register (LOAD/STORE only)
    pub base: Option<String>,
    /// Branch target program index (branches only)
    pub target: Option<usize>,
}

impl Instruction {
    /// Decodes one program line.
    ///
    /// Commas are insignificant; tokens are whitespace-separated.
    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let text = line.trim().to_string();
        let cleaned = text.replace(',', " ");
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();

        let keyword = *tokens.first().ok_or(DecodeError::EmptyLine)?;
        let opcode = Opcode::from_keyword(keyword)
            .ok_or_else(|| DecodeError::UnknownOperation(keyword.to_string()))?;

        let mut inst = Self {
            text,
            opcode,
            dest: None,
            src1: None,
            src2: None,
            imm: None,
            base: None,
            target: None,
        };

        let operands = &tokens[1..];
        let expect = |n: usize| -> Result<(), DecodeError> {
            if operands.len() == n {
                Ok(())
            } else {
                Err(DecodeError::OperandCount {
                    keyword: keyword.to_string(),
                    expected: n,
                    found: operands.len(),
                })
            }
        };

        use Opcode::*;
        match opcode {
            Add | Sub | Mul | Div => {
                expect(3)?;
                inst.dest = Some(operands[0].to_string());
                inst.src1 = Some(operands[1].to_string());
                inst.src2 = Some(operands[2].to_string());
            }
            AddI | SubI | MulI | DivI => {
                expect(3)?;
                inst.dest = Some(operands[0].to_string());
                inst.src1 = Some(operands[1].to_string());
                inst.imm = Some(parse_immediate(operands[2])?);
            }
            Load => {
                expect(2)?;
                inst.dest = Some(operands[0].to_string());
                let (offset, base) = parse_memory_operand(operands[1])?;
                inst.imm = Some(offset);
                inst.base = Some(base);
            }
            Store => {
                expect(2)?;
                inst.src1 = Some(operands[0].to_string());
                let (offset, base) = parse_memory_operand(operands[1])?;
                inst.imm = Some(offset);
                inst.base = Some(base);
            }
            Jump => {
                expect(1)?;
                inst.target = Some(parse_target(operands[0])?);
            }
            Beqz | Bnez => {
                expect(2)?;
                inst.src1 = Some(operands[0].to_string());
                inst.target = Some(parse_target(operands[1])?);
            }
        }

        Ok(inst)
    }

    /// Register names this instruction refers to directly
    /// (memory cells are addressed later, at issue time)
    pub fn referenced_registers(&self) -> impl Iterator<Item = &str> {
        [&self.dest, &self.src1, &self.src2, &self.base]
            .into_iter()
            .filter_map(|r| r.as_deref())
    }
}

/// Parses an immediate literal; a leading '#' is accepted
fn parse_immediate(token: &str) -> Result<i64, DecodeError> {
    let digits = token.strip_prefix('#').unwrap_or(token);
    digits
        .parse::<i64>()
        .map_err(|_| DecodeError::BadImmediate(token.to_string()))
}

/// Parses a branch target program index; a leading '#' is accepted
fn parse_target(token: &str) -> Result<usize, DecodeError> {
    let digits = token.strip_prefix('#').unwrap_or(token);
    digits
        .parse::<usize>()
        .map_err(|_| DecodeError::BadTarget(token.to_string()))
}

/// Parses an `offset(base)` memory operand
fn parse_memory_operand(token: &str) -> Result<(i64, String), DecodeError> {
    let bad = || DecodeError::BadMemoryOperand(token.to_string());

    let open = token.find('(').ok_or_else(bad)?;
    if !token.ends_with(')') {
        return Err(bad());
    }

    let offset_str = &token[..open];
    let base = &token[open + 1..token.len() - 1];
    if base.is_empty() {
        return Err(bad());
    }

    let offset = offset_str
        .strip_prefix('#')
        .unwrap_or(offset_str)
        .parse::<i64>()
        .map_err(|_| bad())?;

    Ok((offset, base.to_string()))
}
