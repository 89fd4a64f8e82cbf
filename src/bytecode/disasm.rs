use crate::bytecode::{Bytecode, OpCode};
use std::fmt::Write;

/// Print disassembly of a bytecode program
pub fn print_bc(bc: &Bytecode) {
    println!("=== BYTECODE PROGRAM ===\n");
    println!("════════════════════════════════════════");
    println!(" main");
    println!(
        " {} bytes, {} constants, {} symbols",
        bc.len(),
        bc.constants.len(),
        bc.symbols.len()
    );
    println!("════════════════════════════════════════");
    print!("{}", disassemble(bc));
    println!();
    print_tables(bc);
}

fn print_tables(bc: &Bytecode) {
    if !bc.constants.is_empty() {
        println!("Constants:");
        for (i, value) in bc.constants.iter().enumerate() {
            println!("  [{:03}] {}", i, value);
        }
    }
    if !bc.symbols.is_empty() {
        println!("Symbols:");
        for (i, name) in bc.symbols.iter().enumerate() {
            println!("  [{:03}] {}", i, name);
        }
    }
}

/// Return disassembly as a String, one instruction per line.
///
/// Jump targets get a separator line and a `►` marker. Bytes that do not
/// decode print as `???` and the listing resumes at the next byte.
pub fn disassemble(bc: &Bytecode) -> String {
    let mut output = String::new();
    let jump_targets = collect_jump_targets(&bc.code);

    let mut ip = 0;
    while ip < bc.code.len() {
        if jump_targets.contains(&ip) {
            output.push_str("      ┌──────────────────────────────────\n");
        }

        let marker = if jump_targets.contains(&ip) { "► " } else { "  " };
        let _ = write!(output, "{:04} {}", ip, marker);

        ip = format_instruction(&mut output, bc, ip);
        output.push('\n');
    }

    output
}

/// Writes the instruction at `ip` and returns the offset of the next one.
fn format_instruction(out: &mut String, bc: &Bytecode, ip: usize) -> usize {
    let byte = bc.code[ip];
    let op = match OpCode::try_from(byte) {
        Ok(op) => op,
        Err(byte) => {
            let _ = write!(out, "???         0x{:02x}", byte);
            return ip + 1;
        }
    };

    if !op.has_operand() {
        out.push_str(op.mnemonic());
        return ip + 1;
    }

    let Some(&operand) = bc.code.get(ip + 1) else {
        let _ = write!(out, "{:<11} <truncated>", op.mnemonic());
        return ip + 1;
    };

    match op {
        OpCode::Constant => {
            let value = bc
                .constants
                .get(operand as usize)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<invalid>".to_string());
            let _ = write!(out, "{:<11} {:<4} ; {}", op.mnemonic(), operand, value);
        }
        OpCode::Load | OpCode::Store => {
            let name = bc
                .symbols
                .get(operand as usize)
                .map(String::as_str)
                .unwrap_or("<invalid>");
            let _ = write!(out, "{:<11} {:<4} ; {}", op.mnemonic(), operand, name);
        }
        _ => {
            let offset = operand as i8;
            let target = jump_target(ip, offset);
            let direction = if offset < 0 { "↑" } else { "↓" };
            let _ = write!(
                out,
                "{:<11} {:+} {} (→ {:04})",
                op.mnemonic(),
                offset,
                direction,
                target
            );
        }
    }

    ip + 2
}

fn jump_target(ip: usize, offset: i8) -> isize {
    (ip + 2) as isize + offset as isize
}

fn collect_jump_targets(code: &[u8]) -> Vec<usize> {
    let mut targets = Vec::new();

    let mut ip = 0;
    while ip < code.len() {
        let Ok(op) = OpCode::try_from(code[ip]) else {
            ip += 1;
            continue;
        };

        if op.is_jump() {
            if let Some(&operand) = code.get(ip + 1) {
                let target = jump_target(ip, operand as i8);
                if target >= 0 && !targets.contains(&(target as usize)) {
                    targets.push(target as usize);
                }
            }
        }

        ip += op.width();
    }

    targets
}
