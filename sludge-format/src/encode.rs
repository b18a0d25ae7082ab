//! Sans-IO encoding primitives for the sludge format.

use byteorder::{ByteOrder, LittleEndian};

use crate::record::{RecordHeader, NAME_LEN, RECORD_HEADER_LEN};

/// Encodes a record header into its fixed on-disk layout.
///
/// The name is NUL-padded; a name of exactly [`NAME_LEN`] bytes fills the field
/// and carries no terminator.
pub fn encode_record_header(header: &RecordHeader) -> [u8; RECORD_HEADER_LEN] {
    let mut buf = [0u8; RECORD_HEADER_LEN];
    let name = header.name.as_bytes();
    let len = name.len().min(NAME_LEN);
    buf[..len].copy_from_slice(&name[..len]);
    LittleEndian::write_u64(&mut buf[NAME_LEN..], header.size);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_record_header;
    use crate::record::RecordName;

    #[test]
    fn name_is_nul_padded() {
        let header = RecordHeader::new("a.txt".into(), 3);
        let buf = encode_record_header(&header);
        assert_eq!(&buf[..5], b"a.txt");
        assert!(buf[5..NAME_LEN].iter().all(|b| *b == 0));
        assert_eq!(&buf[NAME_LEN..], &3u64.to_le_bytes());
    }

    #[test]
    fn decode_inverts_encode_at_boundaries() {
        for name in [
            RecordName::new(vec![b'q'; NAME_LEN]),
            RecordName::new(vec![b'q'; NAME_LEN + 40]),
            RecordName::from("x"),
        ] {
            let header = RecordHeader::new(name, u64::MAX);
            let (decoded, _) = parse_record_header(&encode_record_header(&header)).unwrap();
            assert_eq!(decoded, header);
        }
    }
}
