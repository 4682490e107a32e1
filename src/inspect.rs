//! Post-staging artifact diagnostics: per-function disassembly dump.
//!
//! The staged app is a PE image with a CodeView reference to its PDB. This
//! module reads the procedure symbols out of the PDB and writes a GAS-syntax
//! disassembly of each one to `disas.txt`, addressed at the image's
//! preferred mapping (`image_base + rva`), which makes serial-log addresses
//! easy to correlate once the firmware's load offset is known.
//!
//! Everything here is best-effort: a missing PDB, a stripped image, or an
//! artifact that isn't a PE at all downgrades to a single stderr note and
//! the pipeline carries on.

use std::ffi::CStr;
use std::fmt::Write as _;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use goblin::pe::PE;
use iced_x86::{Decoder, DecoderOptions, Formatter, GasFormatter, Instruction};
use pdb::{FallibleIterator, SymbolData, PDB};

use crate::constants::DISAS_OUTPUT;

/// Write the disassembly dump for `artifact`, or explain on stderr why it
/// was skipped. Never fails.
pub fn write_disassembly(artifact: &Path) {
    match try_write(artifact) {
        Ok(count) => println!("wrote {DISAS_OUTPUT} ({count} functions)"),
        Err(err) => eprintln!("note: skipping disassembly dump: {err:#}"),
    }
}

fn try_write(artifact: &Path) -> Result<usize> {
    let bytes = fs::read(artifact).with_context(|| format!("read {}", artifact.display()))?;
    let pe = PE::parse(&bytes).context("parse PE image")?;

    let (text_data, text_rva) = text_section(&pe, &bytes)?;
    let pdb_path = codeview_pdb_path(&pe)?;
    let procedures = load_procedures(&pdb_path)?;

    let mut out = String::new();
    let mut count = 0usize;
    for proc in &procedures {
        // Symbols outside .text (thunks, data) just don't get dumped.
        let Some(start) = proc.rva.start.checked_sub(text_rva) else {
            continue;
        };
        let Some(end) = proc.rva.end.checked_sub(text_rva) else {
            continue;
        };
        let Some(code) = text_data.get(start as usize..end as usize) else {
            continue;
        };

        let ip = pe.image_base as u64 + u64::from(proc.rva.start);
        out.push_str(&proc.name);
        out.push_str(":\n");
        out.push_str(&disassemble(code, ip));
        out.push('\n');
        count += 1;
    }

    fs::write(DISAS_OUTPUT, out).with_context(|| format!("write {DISAS_OUTPUT}"))?;
    Ok(count)
}

/// A procedure symbol from the PDB: name as recorded, plus its RVA range.
struct ProcedureInfo {
    name: String,
    rva: Range<u32>,
}

fn text_section<'a>(pe: &PE<'_>, bytes: &'a [u8]) -> Result<(&'a [u8], u32)> {
    let section = pe
        .sections
        .iter()
        .find(|s| s.name().map(|name| name == ".text").unwrap_or(false))
        .ok_or_else(|| anyhow!("no .text section"))?;

    let start = section.pointer_to_raw_data as usize;
    let len = section.size_of_raw_data as usize;
    let data = bytes
        .get(start..start.saturating_add(len))
        .ok_or_else(|| anyhow!(".text raw data out of bounds"))?;
    Ok((data, section.virtual_address))
}

fn codeview_pdb_path(pe: &PE<'_>) -> Result<PathBuf> {
    let info = pe
        .debug_data
        .as_ref()
        .and_then(|d| d.codeview_pdb70_debug_info.as_ref())
        .ok_or_else(|| anyhow!("no CodeView PDB reference in the image"))?;

    let raw = CStr::from_bytes_until_nul(info.filename)
        .context("PDB filename is not NUL-terminated")?;
    let path = raw.to_str().context("PDB filename is not UTF-8")?;
    Ok(PathBuf::from(path))
}

fn load_procedures(path: &Path) -> Result<Vec<ProcedureInfo>> {
    let file =
        fs::File::open(path).with_context(|| format!("open PDB {}", path.display()))?;
    let mut pdb = PDB::open(file).context("parse PDB")?;

    let address_map = pdb.address_map()?;
    let dbi = pdb.debug_information()?;
    let mut modules = dbi.modules()?;

    let mut procedures = Vec::new();
    while let Some(module) = modules.next()? {
        let Some(info) = pdb.module_info(&module)? else {
            continue;
        };

        let mut symbols = info.symbols()?;
        while let Some(symbol) = symbols.next()? {
            if let Ok(SymbolData::Procedure(proc)) = symbol.parse() {
                let Some(rva) = proc.offset.to_rva(&address_map) else {
                    continue;
                };
                procedures.push(ProcedureInfo {
                    name: proc.name.to_string().into_owned(),
                    rva: rva.0..rva.0 + proc.len,
                });
            }
        }
    }

    Ok(procedures)
}

fn disassemble(bytes: &[u8], ip: u64) -> String {
    let mut decoder = Decoder::with_ip(64, bytes, ip, DecoderOptions::NONE);

    let mut formatter = GasFormatter::new();
    formatter.options_mut().set_digit_separator("`");
    formatter.options_mut().set_first_operand_char_index(10);

    let mut instruction = Instruction::default();
    let mut line = String::new();
    let mut text = String::new();

    while decoder.can_decode() {
        decoder.decode_out(&mut instruction);
        line.clear();
        formatter.format(&instruction, &mut line);
        let _ = writeln!(text, "{:08x} {line}", instruction.ip());
    }

    text
}
