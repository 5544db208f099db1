//! Flat text form of item stacks as stored in the `inventory` and
//! `trash_item` columns: `kind,count,modifier`, stacks joined by `~`.

use crate::error::FormatError;
use crate::layout::TOTAL_SLOTS;
use crate::models::ItemStack;

const STACK_SEPARATOR: char = '~';
const FIELD_SEPARATOR: char = ',';

pub fn encode_stack(stack: &ItemStack) -> String {
    format!("{}{sep}{}{sep}{}", stack.kind, stack.count, stack.modifier, sep = FIELD_SEPARATOR)
}

pub fn decode_stack(text: &str) -> Result<ItemStack, FormatError> {
    let mut fields = text.split(FIELD_SEPARATOR);
    let kind = parse_field(fields.next(), "kind", text)?;
    let count = parse_field(fields.next(), "count", text)?;
    let modifier = parse_field(fields.next(), "modifier", text)?;
    if fields.next().is_some() {
        return Err(FormatError::Field { field: "stack", text: text.to_string() });
    }
    Ok(ItemStack { kind, count, modifier })
}

fn parse_field<T: std::str::FromStr>(
    field: Option<&str>,
    name: &'static str,
    text: &str,
) -> Result<T, FormatError> {
    field
        .and_then(|f| f.trim().parse().ok())
        .ok_or_else(|| FormatError::Field { field: name, text: text.to_string() })
}

pub fn encode_stacks(stacks: &[ItemStack]) -> String {
    stacks
        .iter()
        .map(encode_stack)
        .collect::<Vec<_>>()
        .join(&STACK_SEPARATOR.to_string())
}

/// Decodes exactly `expected` stacks.
pub fn decode_stacks(text: &str, expected: usize) -> Result<Vec<ItemStack>, FormatError> {
    // "".split('~') yields one empty piece, but the empty string is the encoding of zero stacks.
    if text.is_empty() {
        return if expected == 0 {
            Ok(Vec::new())
        } else {
            Err(FormatError::StackCount { expected, found: 0 })
        };
    }
    let pieces: Vec<&str> = text.split(STACK_SEPARATOR).collect();
    if pieces.len() != expected {
        return Err(FormatError::StackCount { expected, found: pieces.len() });
    }
    pieces.into_iter().map(decode_stack).collect()
}

/// Decodes a full bag inventory of `TOTAL_SLOTS` stacks.
pub fn decode_inventory(text: &str) -> Result<Vec<ItemStack>, FormatError> {
    decode_stacks(text, TOTAL_SLOTS)
}
