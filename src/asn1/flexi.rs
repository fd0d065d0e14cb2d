//! The "flexi decoder": produces a tree of generic ASN.1 nodes
//! for structures whose shape isn't known ahead of time, the way
//! libtomcrypt's `der_decode_sequence_flexi` walks an unfamiliar PKCS#8 or
//! certificate blob one TLV at a time without a hardcoded template.
//!
//! [`crate::asn1::pkcs8`] uses this to peek at `AlgorithmIdentifier`s before
//! deciding how to interpret the payload that follows; a strict, typed
//! `der::decode_*` call is used for everything whose shape is already known.

use crate::{
    asn1::der,
    error::{Error, Result},
};

/// One node of the flexible decode tree. Constructed (`SEQUENCE`/`SET`/
/// explicit context tags) nodes hold their fully-parsed children; primitive
/// nodes keep their raw content bytes, left for the caller to interpret
/// with the appropriate typed `der::decode_*` function.
#[derive(Debug, Clone)]
pub enum Node {
    Primitive { tag: u8, content: Vec<u8> },
    Constructed { tag: u8, children: Vec<Node> },
}

impl Node {
    pub fn tag(&self) -> u8 {
        match self {
            Node::Primitive { tag, .. } => *tag,
            Node::Constructed { tag, .. } => *tag,
        }
    }

    pub fn as_primitive(&self) -> Result<&[u8]> {
        match self {
            Node::Primitive { content, .. } => Ok(content),
            Node::Constructed { .. } => Err(Error::PkAsn1Error("expected primitive node")),
        }
    }

    pub fn as_children(&self) -> Result<&[Node]> {
        match self {
            Node::Constructed { children, .. } => Ok(children),
            Node::Primitive { .. } => Err(Error::PkAsn1Error("expected constructed node")),
        }
    }

    /// Convenience accessor for `SEQUENCE`/`SET` children by index.
    pub fn child(&self, i: usize) -> Result<&Node> {
        self.as_children()?.get(i).ok_or(Error::PkAsn1Error("missing child node"))
    }
}

/// Parse one top-level node out of `data`, returning it and the number of
/// bytes consumed. The constructed bit (`0x20`) in the tag byte decides
/// whether content is recursed into or kept raw.
pub fn parse_node(data: &[u8]) -> Result<(Node, usize)> {
    let (tag, content, consumed) = der::parse_tlv(data)?;
    if tag & 0x20 != 0 {
        let mut children = Vec::new();
        let mut offset = 0;
        while offset < content.len() {
            let (child, used) = parse_node(&content[offset..])?;
            children.push(child);
            offset += used;
        }
        Ok((Node::Constructed { tag, children }, consumed))
    } else {
        Ok((Node::Primitive { tag, content: content.to_vec() }, consumed))
    }
}

/// Parse `data` as a single top-level node, erroring if trailing bytes
/// remain (the usual entry point for "decode this whole blob").
pub fn decode(data: &[u8]) -> Result<Node> {
    let (node, consumed) = parse_node(data)?;
    if consumed != data.len() {
        return Err(Error::PkAsn1Error("trailing bytes after top-level ASN.1 value"));
    }
    Ok(node)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::asn1::der;

    #[test]
    fn flexi_decode_nested_sequence() {
        let inner = der::sequence(&[der::encode_short_integer(7), der::encode_octet_string(b"hi")]);
        let outer = der::sequence(&[der::encode_short_integer(1), inner]);
        let node = decode(&outer).unwrap();
        let children = node.as_children().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].tag(), der::TAG_INTEGER);
        let inner_children = children[1].as_children().unwrap();
        assert_eq!(inner_children.len(), 2);
        assert_eq!(inner_children[1].as_primitive().unwrap(), b"hi");
    }

    #[test]
    fn flexi_decode_rejects_trailing_garbage() {
        let mut data = der::encode_short_integer(1);
        data.push(0xff);
        assert!(decode(&data).is_err());
    }
}
