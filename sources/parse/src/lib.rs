pub mod attributes;
pub mod classfile;
pub mod constants;
pub mod loader;
pub mod parser;
pub mod pool;

#[cfg(test)]
mod tests {
    use crate::attributes::{
        ConstantValueAttribute, InvisibleAnnotationsAttribute, SignatureAttribute,
    };
    use crate::classfile::Resolvable;
    use crate::parser::{decode_modified_utf8, Parser};
    use crate::pool::ConstantEntry;
    use anyhow::{Context, Result};
    use support::flags::AccessFlags;

    fn u16(out: &mut Vec<u8>, v: u16) {
        out.extend_from_slice(&v.to_be_bytes());
    }

    fn utf8(out: &mut Vec<u8>, s: &str) {
        out.push(1);
        u16(out, s.len() as u16);
        out.extend_from_slice(s.as_bytes());
    }

    fn attribute(out: &mut Vec<u8>, name: u16, body: &[u8]) {
        u16(out, name);
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(body);
    }

    /// `public class Sample extends java.lang.Object` with one `long` constant field carrying a
    /// signature and an invisible annotation.
    fn sample() -> Vec<u8> {
        let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE];
        u16(&mut out, 0);
        u16(&mut out, 52);

        // #1..#13, #11 is a long and takes two slots
        u16(&mut out, 14);
        utf8(&mut out, "Sample"); // 1
        out.push(7);
        u16(&mut out, 1); // 2
        utf8(&mut out, "java/lang/Object"); // 3
        out.push(7);
        u16(&mut out, 3); // 4
        utf8(&mut out, "ID"); // 5
        utf8(&mut out, "J"); // 6
        utf8(&mut out, "ConstantValue"); // 7
        utf8(&mut out, "Signature"); // 8
        utf8(&mut out, "RuntimeInvisibleAnnotations"); // 9
        utf8(&mut out, "Lfoo/Marker;"); // 10
        out.push(5);
        out.extend_from_slice(&42i64.to_be_bytes()); // 11, 12
        utf8(&mut out, "TT;"); // 13

        u16(&mut out, 0x0021);
        u16(&mut out, 2);
        u16(&mut out, 4);
        u16(&mut out, 0); // interfaces

        u16(&mut out, 1); // fields
        u16(&mut out, 0x0019);
        u16(&mut out, 5);
        u16(&mut out, 6);
        u16(&mut out, 3);
        attribute(&mut out, 7, &11u16.to_be_bytes());
        attribute(&mut out, 8, &13u16.to_be_bytes());
        // one annotation, type #10, one pair: name #5 = int const #11
        attribute(&mut out, 9, &[0, 1, 0, 10, 0, 1, 0, 5, b'I', 0, 11]);

        u16(&mut out, 0); // methods
        u16(&mut out, 0); // attributes
        out
    }

    #[test]
    fn it_parses_a_class_file() -> Result<()> {
        let class = Parser::new(&sample()).parse()?;
        let pool = &class.constant_pool;

        assert_eq!(class.name()?, "Sample");
        assert_eq!(class.meta_data.packed(), 52);
        assert!(class.access_flags.has(AccessFlags::SUPER));
        assert_eq!(
            pool.class_name(class.super_class.as_ref().unwrap())?,
            "java/lang/Object"
        );

        let field = class.fields.iter().next().unwrap();
        assert_eq!(pool.utf8(&field.name)?, "ID");

        let value = field
            .attributes
            .find::<ConstantValueAttribute>(pool)?
            .context("ConstantValue attribute")?;
        assert!(matches!(value.value.try_resolve(pool)?, ConstantEntry::Long(42)));

        let signature = field
            .attributes
            .find::<SignatureAttribute>(pool)?
            .context("Signature attribute")?;
        assert_eq!(pool.utf8(&signature.signature)?, "TT;");

        let annotations = field
            .attributes
            .find::<InvisibleAnnotationsAttribute>(pool)?
            .context("RuntimeInvisibleAnnotations attribute")?;
        assert_eq!(annotations.annotations.len(), 1);
        assert_eq!(
            pool.utf8(&annotations.annotations[0].type_descriptor)?,
            "Lfoo/Marker;"
        );

        assert_eq!(
            field
                .attributes
                .others(pool, &["ConstantValue", "Signature"])?,
            vec!["RuntimeInvisibleAnnotations"]
        );

        Ok(())
    }

    #[test]
    fn it_rejects_bad_magic_and_trailing_bytes() {
        let mut bytes = sample();
        bytes[0] = 0xCB;
        assert!(Parser::new(&bytes).parse().is_err());

        let mut bytes = sample();
        bytes.push(0);
        assert!(Parser::new(&bytes).parse().is_err());

        let bytes = sample();
        assert!(Parser::new(&bytes[..bytes.len() - 1]).parse().is_err());
    }

    #[test]
    fn it_decodes_modified_utf8() -> Result<()> {
        assert_eq!(decode_modified_utf8(b"plain")?, "plain");
        assert_eq!(decode_modified_utf8(&[b'a', 0xC0, 0x80, b'b'])?, "a\0b");
        // U+1F600 as an encoded surrogate pair
        assert_eq!(
            decode_modified_utf8(&[0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80])?,
            "\u{1F600}"
        );

        Ok(())
    }
}
