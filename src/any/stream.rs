// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Moving Any values in and out of CDR streams.

use tracing::debug;

use super::{marshal_payload, unmarshal_payload, Any, Payload};
use crate::core::{OrbError, Result};
use crate::encoding::cdr::{CdrInputStream, CdrOutputStream};
use crate::typecode::TypeCode;

impl Any {
    /// Create an output stream for building a value to hand to
    /// [`read_value_from_output`](Self::read_value_from_output).
    ///
    /// The stream is tagged as Any-owned, so its bytes are adopted rather
    /// than copied when read back.
    pub fn create_output_stream(&self) -> CdrOutputStream {
        CdrOutputStream::new(&self.orb).mark_any_owned()
    }

    /// Create an independent cursor over the encoded value.
    ///
    /// The cursor is never Any-owned: nested Anys read from it copy their
    /// values and leave the bytes that follow in place.
    pub fn create_input_stream(&self) -> Result<CdrInputStream> {
        if !self.initialized {
            return Err(OrbError::bad_operation(
                "create_input_stream",
                "Any is not initialized",
            ));
        }
        if let Payload::Streamed(stream) = &self.payload {
            return Ok(stream.clone().clear_any_owned());
        }
        let mut out = CdrOutputStream::new(&self.orb);
        self.write_value(&mut out)?;
        out.into_input_stream()
    }

    /// Bind `tc` and read a value of that type from `input`.
    ///
    /// Constructed values from an Any-owned stream are adopted in place and
    /// the input is left at its end; from any other stream they are copied
    /// into a private buffer. Other values are decoded.
    pub fn read_value(&mut self, input: &mut CdrInputStream, tc: &TypeCode) -> Result<()> {
        let resolved = tc.resolve()?;
        let payload = if !resolved.kind().is_streamed() {
            unmarshal_payload(&resolved, input)?
        } else if input.is_any_stream() {
            debug!(
                kind = %resolved.kind(),
                position = input.position(),
                remaining = input.remaining(),
                "adopting any-owned stream"
            );
            let view = input.clone().clear_any_owned();
            input.skip_to_end();
            Payload::Streamed(view)
        } else {
            let mut out = CdrOutputStream::with_byte_order(input.orb(), input.is_little_endian())
                .with_giop_version(input.giop_version())
                .with_char_codeset(input.char_codeset());
            tc.copy(input, &mut out)?;
            Payload::Streamed(out.into_input_stream()?)
        };
        self.type_code = tc.clone();
        self.payload = payload;
        self.initialized = true;
        Ok(())
    }

    /// Bind `tc` and read the value written into `out`.
    pub fn read_value_from_output(&mut self, out: CdrOutputStream, tc: &TypeCode) -> Result<()> {
        let mut input = out.into_input_stream()?;
        self.read_value(&mut input, tc)
    }

    /// Write the value (without its TypeCode) to `out`.
    pub fn write_value(&self, out: &mut CdrOutputStream) -> Result<()> {
        if !self.initialized {
            return Err(OrbError::bad_operation("write_value", "Any is not initialized"));
        }
        if let Payload::Streamed(stream) = &self.payload {
            let mut input = stream.clone();
            return self.type_code.copy(&mut input, out);
        }
        let stripped = self.type_code.resolve_alias_and_indirect()?;
        marshal_payload(&stripped, &self.payload, out)
    }

    /// Build an Any of type `tc` from the value at the front of `input`.
    pub fn extract_any_from_stream(tc: &TypeCode, input: &mut CdrInputStream) -> Result<Any> {
        let mut any = Any::new(input.orb());
        any.read_value(input, tc)?;
        Ok(any)
    }
}

impl CdrOutputStream {
    /// Write an Any: its TypeCode, then its value.
    pub fn write_any(&mut self, value: &Any) -> Result<&mut Self> {
        if !value.is_initialized() {
            return Err(OrbError::bad_operation("write_any", "Any is not initialized"));
        }
        self.write_type_code(value.type_code())?;
        value.write_value(self)?;
        Ok(self)
    }
}

impl CdrInputStream {
    /// Read an Any: a TypeCode, then a value of that type.
    pub fn read_any(&mut self) -> Result<Any> {
        let tc = self.read_type_code()?;
        Any::extract_any_from_stream(&tc, self)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::OrbError;
    use crate::{Orb, StructMember, TypeCode, TypeKind};

    fn point(orb: &Orb) -> TypeCode {
        let float = orb.primitive_tc(TypeKind::Float).unwrap();
        orb.create_struct_tc(
            "IDL:Point:1.0",
            "Point",
            vec![
                StructMember::new("x", float.clone()),
                StructMember::new("y", float),
            ],
        )
    }

    #[test]
    fn test_adopts_any_owned_stream() {
        let orb = Orb::default();
        let mut any = orb.create_any();
        let mut out = any.create_output_stream();
        out.write_float(1.5).unwrap();
        out.write_float(-2.25).unwrap();
        let mut input = out.into_input_stream().unwrap();
        any.read_value(&mut input, &point(&orb)).unwrap();
        assert!(input.is_at_end());

        let mut cursor = any.create_input_stream().unwrap();
        assert!(cursor.shares_buffer_with(&input));
        assert!(!cursor.is_any_stream());
        assert_eq!(cursor.read_float().unwrap(), 1.5);
        assert_eq!(cursor.read_float().unwrap(), -2.25);
    }

    #[test]
    fn test_nested_any_leaves_following_members() {
        let orb = Orb::default();
        let holder = orb.create_struct_tc(
            "IDL:Holder:1.0",
            "Holder",
            vec![
                StructMember::new("a", orb.primitive_tc(TypeKind::Any).unwrap()),
                StructMember::new("b", orb.primitive_tc(TypeKind::Long).unwrap()),
            ],
        );
        let build = || {
            let mut inner = orb.create_any();
            let mut out = inner.create_output_stream();
            out.write_float(1.0).unwrap();
            out.write_float(2.0).unwrap();
            inner.read_value_from_output(out, &point(&orb)).unwrap();

            let mut any = orb.create_any();
            let mut out = any.create_output_stream();
            out.write_any(&inner).unwrap();
            out.write_long(7).unwrap();
            any.read_value_from_output(out, &holder).unwrap();
            any
        };
        let (first, second) = (build(), build());

        let mut cursor = first.create_input_stream().unwrap();
        let inner = cursor.read_any().unwrap();
        assert_eq!(inner.create_input_stream().unwrap().remaining(), 8);
        assert_eq!(cursor.read_long().unwrap(), 7);
        assert!(cursor.is_at_end());
        assert!(first.equal(&second).unwrap());
    }

    #[test]
    fn test_copies_foreign_stream() {
        let orb = Orb::default();
        let mut out = orb.create_output_stream();
        out.write_float(3.0).unwrap();
        out.write_float(4.0).unwrap();
        out.write_long(99).unwrap();
        let mut input = out.into_input_stream().unwrap();

        let mut any = orb.create_any();
        any.read_value(&mut input, &point(&orb)).unwrap();
        assert_eq!(input.read_long().unwrap(), 99);

        let cursor = any.create_input_stream().unwrap();
        assert!(!cursor.shares_buffer_with(&input));
        assert_eq!(cursor.remaining(), 8);
    }

    #[test]
    fn test_any_round_trip_through_stream() {
        let orb = Orb::default();
        let mut any = orb.create_any();
        any.insert_string("hello").unwrap();

        let mut out = orb.create_output_stream();
        out.write_any(&any).unwrap();
        let mut input = out.into_input_stream().unwrap();
        let read = input.read_any().unwrap();
        assert_eq!(read.extract_string().unwrap(), "hello");
        assert!(read.equal(&any).unwrap());
        assert!(input.is_at_end());
    }

    #[test]
    fn test_uninitialized_any_cannot_be_written() {
        let orb = Orb::default();
        let mut any = orb.create_any();
        any.set_type(point(&orb));
        let mut out = orb.create_output_stream();
        assert!(matches!(
            any.write_value(&mut out),
            Err(OrbError::BadOperation { .. })
        ));
        assert!(any.create_input_stream().is_err());
    }

    #[test]
    fn test_scalar_input_stream() {
        let orb = Orb::default();
        let mut any = orb.create_any();
        any.insert_ulong(0xDEAD_BEEF);
        let mut cursor = any.create_input_stream().unwrap();
        assert_eq!(cursor.read_ulong().unwrap(), 0xDEAD_BEEF);
        assert!(cursor.is_at_end());
    }
}
