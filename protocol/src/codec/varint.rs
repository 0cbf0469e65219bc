//! LEB128 varints. Signed integers are zig-zag mapped by `integer-encoding`'s
//! `i64` impl, which matches protobuf `sint*`.

use integer_encoding::VarInt;

use super::CodecError;

/// Longest valid encoding of a 64-bit integer.
const MAX_VARINT_LEN: usize = 10;

/// Appends the varint encoding of `value` without a heap temporary.
pub fn write_varint<VI: VarInt>(buf: &mut Vec<u8>, value: VI) {
    let mut scratch = [0u8; MAX_VARINT_LEN];
    let written = value.encode_var(&mut scratch);
    buf.extend_from_slice(&scratch[..written]);
}

/// Reads an unsigned varint starting at `*pos`, advancing `*pos` past it.
pub fn read_varint(bytes: &[u8], pos: &mut usize) -> Result<u64, CodecError> {
    read(bytes, pos)
}

/// Reads a zig-zag varint starting at `*pos`, advancing `*pos` past it.
pub fn read_sint(bytes: &[u8], pos: &mut usize) -> Result<i64, CodecError> {
    read(bytes, pos)
}

fn read<VI: VarInt>(bytes: &[u8], pos: &mut usize) -> Result<VI, CodecError> {
    let rest = bytes.get(*pos..).unwrap_or(&[]);
    match VI::decode_var(rest) {
        Some((value, len)) => {
            *pos += len;
            Ok(value)
        }
        // Every byte still had its continuation bit: the input ran out.
        None if rest.len() < MAX_VARINT_LEN && rest.iter().all(|b| b & 0x80 != 0) => {
            Err(CodecError::UnexpectedEof)
        }
        None => Err(CodecError::VarintOverflow),
    }
}
