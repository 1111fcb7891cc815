//! Human-readable rendering of fields.
//!
//! One line per field:
//! `BYTE:BIT+LENGTH name = value [raw: 0x.. 0x..]`

use nom::{
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res},
    sequence::preceded,
    IResult, Parser,
};

use crate::fields::{BitAddress, FieldDescriptor, FieldError, FieldRegistry, FieldResult};

/// Space separated `0x..` bytes
pub fn format_raw(raw: &[u8]) -> String {
    raw.iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Assemble one display line from already rendered parts
pub fn format_line(field: &FieldDescriptor, value: &str, raw: &str) -> String {
    format!(
        "{} {} = {} [raw: {}]",
        field.format_address(),
        field.name(),
        value,
        raw
    )
}

/// Decode and render one field of `registry`
pub fn render_field(registry: &FieldRegistry, field: &FieldDescriptor) -> FieldResult<String> {
    let value = registry.value_of(field)?;
    let raw = field.raw_value(registry.buffer())?;
    Ok(format_line(field, &value.to_string(), &format_raw(&raw)))
}

/// Render every field in registration order, failing on the first field that
/// does not decode
pub fn render_registry(registry: &FieldRegistry) -> FieldResult<String> {
    let lines = registry
        .iter()
        .map(|field| render_field(registry, field))
        .collect::<FieldResult<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

fn decimal(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |digits: &str| digits.parse::<usize>()).parse(input)
}

fn address(input: &str) -> IResult<&str, (usize, usize, usize)> {
    (decimal, preceded(char(':'), decimal), preceded(char('+'), decimal)).parse(input)
}

/// Parse the `BYTE:BIT+LENGTH` form produced by
/// [`FieldDescriptor::format_address`]
pub fn parse_address(text: &str) -> FieldResult<BitAddress> {
    let text = text.trim();
    let (_, (byte_pos, bit_pos, length)) = all_consuming(address)
        .parse(text)
        .map_err(|_| FieldError::Address(text.to_string()))?;

    if length == 0 {
        return Err(FieldError::Address(text.to_string()));
    }
    BitAddress::from_parts(byte_pos, bit_pos, length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitwise::DataType;

    #[test]
    fn test_format_raw() {
        assert_eq!(format_raw(&[0x34, 0x32]), "0x34 0x32");
        assert_eq!(format_raw(&[0x01]), "0x01");
        assert_eq!(format_raw(&[]), "");
    }

    #[test]
    fn test_render_field() {
        let mut registry = FieldRegistry::new(vec![0x12, 0x34, 0x56, 0x78, 0x34, 0x32]);
        registry.add(DataType::UInt, "testval", 8, 8).unwrap();
        registry.add(DataType::Int, "signed", 28, 3).unwrap();

        let field = registry.get_item("testval").unwrap();
        assert_eq!(
            render_field(&registry, field).unwrap(),
            "0001:0+8 testval = 52 [raw: 0x34]"
        );

        let field = registry.get_item("signed").unwrap();
        assert_eq!(
            render_field(&registry, field).unwrap(),
            "0003:4+3 signed = -1 [raw: 0x07]"
        );
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0004:0+16").unwrap(), BitAddress::new(32, 16));
        assert_eq!(parse_address(" 0000:1+1 ").unwrap(), BitAddress::new(1, 1));
        assert_eq!(parse_address("12345:7+3").unwrap(), BitAddress::new(98767, 3));
    }

    #[test]
    fn test_parse_address_rejects() {
        for bad in ["", "0004:0", "0004:8+1", "0004:0+0", "x:0+1", "0004:0+16 tail"] {
            assert!(
                matches!(parse_address(bad), Err(FieldError::Address(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_address_round_trip() {
        for start in [0usize, 1, 7, 8, 9, 63, 1000, 80_001] {
            for length in [1usize, 3, 8, 16, 129] {
                let field = FieldDescriptor::new(DataType::Raw, "f", start, length).unwrap();
                let parsed = parse_address(&field.format_address()).unwrap();
                assert_eq!(parsed, field.address());
                assert_eq!(parsed.byte_pos() * 8 + parsed.bit_pos(), start);
            }
        }
    }
}
