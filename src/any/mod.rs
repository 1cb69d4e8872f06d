// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Self-describing values.
//!
//! An [`Any`] pairs a TypeCode with a value of that type. How the value is
//! held depends on the bound type:
//!
//! - scalars (integers, floating point, boolean, characters, enums) are a
//!   raw bit pattern;
//! - strings, nested Anys, TypeCodes, object references, fixed decimals and
//!   value type instances are boxed;
//! - constructed types (struct, union, sequence, array, alias, exception)
//!   and Principal stay encoded, as a cursor over a CDR buffer that records
//!   its own byte order.
//!
//! Typed extraction decodes an encoded value on demand, so an Any bound to
//! an alias of `long` still yields its value through `extract_long`.

mod compare;
mod stream;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::core::{OrbError, Result};
use crate::encoding::cdr::{CdrInputStream, CdrOutputStream};
use crate::typecode::{check_bound, is_scalar, read_scalar, write_scalar, TypeCode, TypeKind};
use crate::value::valuetype::{read_value, write_value};
use crate::value::{CorbaValue, FixedDecimal, ObjectRef};
use crate::Orb;

// ============================================================================
// Payload
// ============================================================================

/// Heap-held value of a non-scalar, non-streamed kind.
#[derive(Debug, Clone)]
pub(crate) enum Boxed {
    String(String),
    Any(Box<Any>),
    TypeCode(TypeCode),
    Object(ObjectRef),
    Fixed(FixedDecimal),
    Value(Option<Arc<dyn CorbaValue>>),
}

#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Empty,
    Scalar(u64),
    Boxed(Boxed),
    /// Encoded value; the cursor sits at its first byte
    Streamed(CdrInputStream),
}

/// Decode a value of the alias-free type `tc` into a payload.
pub(crate) fn unmarshal_payload(tc: &TypeCode, input: &mut CdrInputStream) -> Result<Payload> {
    let kind = tc.kind();
    if is_scalar(kind) {
        return Ok(Payload::Scalar(read_scalar(input, kind)?));
    }
    let boxed = match kind {
        TypeKind::Null | TypeKind::Void | TypeKind::Native => return Ok(Payload::Empty),
        TypeKind::String | TypeKind::WString => {
            let value = if kind == TypeKind::String {
                input.read_string()?
            } else {
                input.read_wstring()?
            };
            check_bound(kind.name(), tc.length()?, value.chars().count())?;
            Boxed::String(value)
        }
        TypeKind::Any => Boxed::Any(Box::new(input.read_any()?)),
        TypeKind::TypeCode => Boxed::TypeCode(input.read_type_code()?),
        TypeKind::ObjRef => Boxed::Object(input.read_object()?),
        TypeKind::Fixed => {
            let digits = tc.fixed_digits()?;
            let bytes = input.read_octets((usize::from(digits) + 2) / 2)?;
            Boxed::Fixed(FixedDecimal::from_bcd(&bytes, tc.fixed_scale()?)?)
        }
        TypeKind::Value | TypeKind::ValueBox => Boxed::Value(read_value(input, tc)?),
        TypeKind::AbstractInterface => {
            if input.read_boolean()? {
                Boxed::Object(input.read_object()?)
            } else {
                Boxed::Value(read_value(input, tc)?)
            }
        }
        TypeKind::LongDouble => return Err(OrbError::unsupported("long double")),
        other => return Err(OrbError::bad_kind("unmarshal", other)),
    };
    Ok(Payload::Boxed(boxed))
}

/// Encode a scalar or boxed payload of the alias-free type `tc`.
pub(crate) fn marshal_payload(
    tc: &TypeCode,
    payload: &Payload,
    out: &mut CdrOutputStream,
) -> Result<()> {
    let kind = tc.kind();
    match payload {
        Payload::Empty => match kind {
            TypeKind::Null | TypeKind::Void | TypeKind::Native => {}
            other => {
                return Err(OrbError::bad_operation(
                    "write_value",
                    format!("Any bound to {other} holds no value"),
                ))
            }
        },
        Payload::Scalar(bits) => write_scalar(out, kind, *bits)?,
        Payload::Boxed(boxed) => match boxed {
            Boxed::String(value) if kind == TypeKind::WString => {
                out.write_wstring(value)?;
            }
            Boxed::String(value) => {
                out.write_string(value)?;
            }
            Boxed::Any(value) => {
                out.write_any(value)?;
            }
            Boxed::TypeCode(value) => {
                out.write_type_code(value)?;
            }
            Boxed::Object(object) => {
                if kind == TypeKind::AbstractInterface {
                    out.write_boolean(true)?;
                }
                out.write_object(object)?;
            }
            Boxed::Fixed(value) => {
                out.write_fixed(value, tc.fixed_digits()?, tc.fixed_scale()?)?;
            }
            Boxed::Value(value) => {
                if kind == TypeKind::AbstractInterface {
                    out.write_boolean(false)?;
                }
                write_value(out, value.as_ref())?;
            }
        },
        Payload::Streamed(stream) => {
            let mut input = stream.clone();
            tc.copy(&mut input, out)?;
        }
    }
    Ok(())
}

// ============================================================================
// Any
// ============================================================================

/// A value together with the TypeCode describing it.
#[derive(Clone)]
pub struct Any {
    orb: Orb,
    type_code: TypeCode,
    payload: Payload,
    initialized: bool,
}

impl Any {
    /// Create an Any bound to `tk_null`.
    pub(crate) fn new(orb: &Orb) -> Self {
        Self {
            orb: orb.clone(),
            type_code: orb.empty_tc(TypeKind::Null),
            payload: Payload::Empty,
            initialized: true,
        }
    }

    /// Create an Any holding a scalar bit pattern of type `tc`.
    pub(crate) fn from_scalar(orb: &Orb, tc: TypeCode, bits: u64) -> Self {
        Self {
            orb: orb.clone(),
            type_code: tc,
            payload: Payload::Scalar(bits),
            initialized: true,
        }
    }

    /// The scalar bit pattern held, decoding an encoded value if needed.
    pub(crate) fn scalar_bits(&self) -> Option<u64> {
        match &self.payload {
            Payload::Scalar(bits) => Some(*bits),
            Payload::Streamed(stream) => {
                let kind = self.type_code.resolve_alias_and_indirect().ok()?.kind();
                if !is_scalar(kind) {
                    return None;
                }
                read_scalar(&mut stream.clone(), kind).ok()
            }
            _ => None,
        }
    }

    /// The ORB this Any belongs to.
    pub fn orb(&self) -> &Orb {
        &self.orb
    }

    /// The bound TypeCode.
    pub fn type_code(&self) -> &TypeCode {
        &self.type_code
    }

    /// Kind of the bound TypeCode, following indirections.
    pub fn kind(&self) -> TypeKind {
        self.type_code
            .try_resolve()
            .map_or(self.type_code.kind(), |tc| tc.kind())
    }

    /// Whether the Any holds a value (always true for `null` and `void`).
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bind a new type and discard the value.
    ///
    /// Only `null` is initialized afterwards; every other type, `void`
    /// included, needs a value inserted or read before it can be extracted
    /// or written.
    pub fn set_type(&mut self, tc: TypeCode) {
        let kind = tc.try_resolve().map_or(tc.kind(), |resolved| resolved.kind());
        self.initialized = kind == TypeKind::Null;
        self.type_code = tc;
        self.payload = Payload::Empty;
    }

    /// Index of the branch of the bound union type selected by `discriminator`.
    pub fn current_union_member_index(&self, discriminator: &Any) -> Result<i32> {
        self.type_code
            .resolve_alias_and_indirect()?
            .current_union_member_index(discriminator)
    }

    fn set_scalar(&mut self, kind: TypeKind, bits: u64) {
        self.type_code = self.orb.empty_tc(kind);
        self.payload = Payload::Scalar(bits);
        self.initialized = true;
    }

    /// Bind `tc` and store `payload`, encoding it when `tc` is streamed.
    fn bind(&mut self, tc: TypeCode, payload: Payload) -> Result<()> {
        let payload = match payload {
            Payload::Streamed(_) => payload,
            payload if tc.resolve()?.kind().is_streamed() => {
                let stripped = tc.resolve_alias_and_indirect()?;
                let mut out = CdrOutputStream::new(&self.orb);
                marshal_payload(&stripped, &payload, &mut out)?;
                Payload::Streamed(out.into_input_stream()?)
            }
            payload => payload,
        };
        self.type_code = tc;
        self.payload = payload;
        self.initialized = true;
        Ok(())
    }

    fn bound_kind(&self) -> Option<TypeKind> {
        self.type_code.try_resolve().map(|tc| tc.kind())
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Insert a `short`.
    pub fn insert_short(&mut self, value: i16) {
        self.set_scalar(TypeKind::Short, u64::from(value as u16));
    }

    /// Insert a `long`. An existing enum binding is kept.
    pub fn insert_long(&mut self, value: i32) {
        let bits = u64::from(value as u32);
        if matches!(self.bound_kind(), Some(TypeKind::Long | TypeKind::Enum)) {
            self.payload = Payload::Scalar(bits);
            self.initialized = true;
        } else {
            self.set_scalar(TypeKind::Long, bits);
        }
    }

    /// Insert an `unsigned short`.
    pub fn insert_ushort(&mut self, value: u16) {
        self.set_scalar(TypeKind::UShort, u64::from(value));
    }

    /// Insert an `unsigned long`.
    pub fn insert_ulong(&mut self, value: u32) {
        self.set_scalar(TypeKind::ULong, u64::from(value));
    }

    /// Insert a `long long`.
    pub fn insert_longlong(&mut self, value: i64) {
        self.set_scalar(TypeKind::LongLong, value as u64);
    }

    /// Insert an `unsigned long long`.
    pub fn insert_ulonglong(&mut self, value: u64) {
        self.set_scalar(TypeKind::ULongLong, value);
    }

    /// Insert a `float`.
    pub fn insert_float(&mut self, value: f32) {
        self.set_scalar(TypeKind::Float, u64::from(value.to_bits()));
    }

    /// Insert a `double`.
    pub fn insert_double(&mut self, value: f64) {
        self.set_scalar(TypeKind::Double, value.to_bits());
    }

    /// Insert a `boolean`.
    pub fn insert_boolean(&mut self, value: bool) {
        self.set_scalar(TypeKind::Boolean, u64::from(value));
    }

    /// Insert a `char`.
    pub fn insert_char(&mut self, value: char) {
        self.set_scalar(TypeKind::Char, u64::from(u32::from(value)));
    }

    /// Insert a `wchar`.
    pub fn insert_wchar(&mut self, value: char) {
        self.set_scalar(TypeKind::WChar, u64::from(u32::from(value)));
    }

    /// Insert an `octet`.
    pub fn insert_octet(&mut self, value: u8) {
        self.set_scalar(TypeKind::Octet, u64::from(value));
    }

    /// Insert a `string`.
    ///
    /// An existing bounded string binding is kept, and the value must fit
    /// its bound.
    pub fn insert_string(&mut self, value: &str) -> Result<()> {
        self.insert_text(TypeKind::String, value)
    }

    /// Insert a `wstring`, keeping an existing bounded wstring binding.
    pub fn insert_wstring(&mut self, value: &str) -> Result<()> {
        self.insert_text(TypeKind::WString, value)
    }

    fn insert_text(&mut self, kind: TypeKind, value: &str) -> Result<()> {
        let bounded = self
            .type_code
            .try_resolve()
            .filter(|tc| tc.kind() == kind)
            .and_then(|tc| tc.length().ok())
            .filter(|&bound| bound > 0);
        let tc = match bounded {
            Some(bound) => {
                let len = value.chars().count();
                if len > bound as usize {
                    return Err(OrbError::data_conversion(format!(
                        "{kind} of length {len} exceeds bound {bound}"
                    )));
                }
                self.type_code.clone()
            }
            None => self.orb.unbounded_string_tc(kind == TypeKind::WString),
        };
        self.type_code = tc;
        self.payload = Payload::Boxed(Boxed::String(value.to_string()));
        self.initialized = true;
        Ok(())
    }

    /// Insert a nested Any.
    pub fn insert_any(&mut self, value: Any) {
        self.type_code = self.orb.empty_tc(TypeKind::Any);
        self.payload = Payload::Boxed(Boxed::Any(Box::new(value)));
        self.initialized = true;
    }

    /// Insert a TypeCode.
    pub fn insert_type_code(&mut self, value: TypeCode) {
        self.type_code = self.orb.empty_tc(TypeKind::TypeCode);
        self.payload = Payload::Boxed(Boxed::TypeCode(value));
        self.initialized = true;
    }

    /// Insert an object reference typed as `CORBA::Object`.
    pub fn insert_object(&mut self, object: ObjectRef) {
        self.type_code = self.orb.object_tc();
        self.payload = Payload::Boxed(Boxed::Object(object));
        self.initialized = true;
    }

    /// Insert an object reference with an explicit interface type.
    ///
    /// Fails with `BadOperation` if `tc` is not an interface type or the
    /// object is not compatible with it.
    pub fn insert_object_with_type(&mut self, object: ObjectRef, tc: TypeCode) -> Result<()> {
        let resolved = tc.resolve_alias_and_indirect()?;
        if resolved.kind() != TypeKind::ObjRef {
            return Err(OrbError::bad_operation(
                "insert_object",
                format!("type mismatch: {} is not an interface type", resolved.kind()),
            ));
        }
        let id = resolved.id()?;
        if !object.is_compatible_with(&id) {
            return Err(OrbError::bad_operation(
                "insert_object",
                format!("type mismatch: {} is not a {id}", object.type_id()),
            ));
        }
        self.bind(tc, Payload::Boxed(Boxed::Object(object)))
    }

    /// Insert a fixed-point decimal with its own digits and scale.
    pub fn insert_fixed(&mut self, value: FixedDecimal) {
        self.type_code = self
            .orb
            .create_fixed_tc(value.digit_count(), value.scale() as i16);
        self.payload = Payload::Boxed(Boxed::Fixed(value));
        self.initialized = true;
    }

    /// Insert a fixed-point decimal as a value of the fixed type `tc`.
    ///
    /// Fails with `BadInvOrder` if the value has more digits or a larger
    /// scale than `tc` allows.
    pub fn insert_fixed_with_type(&mut self, value: FixedDecimal, tc: TypeCode) -> Result<()> {
        let resolved = tc.resolve_alias_and_indirect()?;
        if resolved.kind() != TypeKind::Fixed {
            return Err(OrbError::bad_operation(
                "insert_fixed",
                format!("type mismatch: {} is not a fixed type", resolved.kind()),
            ));
        }
        let (digits, scale) = (resolved.fixed_digits()?, resolved.fixed_scale()?);
        if value.digit_count() > digits || i32::from(value.scale()) > i32::from(scale) {
            return Err(OrbError::bad_inv_order(format!(
                "{value} does not fit fixed<{digits},{scale}>"
            )));
        }
        self.bind(tc, Payload::Boxed(Boxed::Fixed(value)))
    }

    /// Insert a value type instance, typed by the TypeCode registered for
    /// its repository id.
    pub fn insert_value(&mut self, value: Arc<dyn CorbaValue>) -> Result<()> {
        let id = value.repository_id();
        let tc = self
            .orb
            .lookup_type_code(id)
            .filter(|tc| matches!(tc.kind(), TypeKind::Value | TypeKind::ValueBox))
            .ok_or_else(|| OrbError::bad_param(format!("no value type registered for '{id}'")))?;
        self.bind(tc, Payload::Boxed(Boxed::Value(Some(value))))
    }

    /// Insert a (possibly null) value as a value of type `tc`.
    pub fn insert_value_with_type(
        &mut self,
        value: Option<Arc<dyn CorbaValue>>,
        tc: TypeCode,
    ) -> Result<()> {
        let kind = tc.resolve_alias_and_indirect()?.kind();
        if !matches!(
            kind,
            TypeKind::Value | TypeKind::ValueBox | TypeKind::AbstractInterface
        ) {
            return Err(OrbError::bad_operation(
                "insert_value",
                format!("type mismatch: {kind} is not a value type"),
            ));
        }
        self.bind(tc, Payload::Boxed(Boxed::Value(value)))
    }

    /// Insert a Principal as its opaque octets.
    pub fn insert_principal(&mut self, value: &[u8]) -> Result<()> {
        let mut out = CdrOutputStream::new(&self.orb);
        out.write_octet_sequence(value)?;
        self.type_code = self.orb.empty_tc(TypeKind::Principal);
        self.payload = Payload::Streamed(out.into_input_stream()?);
        self.initialized = true;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Extraction
    // ------------------------------------------------------------------------

    /// Check the state and the alias-free bound kind, and return the payload
    /// with encoded non-streamed values decoded.
    fn checked(
        &self,
        operation: &'static str,
        accepted: &[TypeKind],
    ) -> Result<(TypeCode, Cow<'_, Payload>)> {
        if !self.initialized {
            return Err(OrbError::bad_operation(operation, "Any is not initialized"));
        }
        let stripped = self.type_code.resolve_alias_and_indirect()?;
        if !accepted.contains(&stripped.kind()) {
            return Err(OrbError::bad_operation(
                operation,
                format!("type mismatch: Any holds {}", stripped.kind()),
            ));
        }
        let payload = match &self.payload {
            Payload::Streamed(stream) if !stripped.kind().is_streamed() => {
                Cow::Owned(unmarshal_payload(&stripped, &mut stream.clone())?)
            }
            payload => Cow::Borrowed(payload),
        };
        Ok((stripped, payload))
    }

    fn extract_scalar(&self, operation: &'static str, accepted: &[TypeKind]) -> Result<u64> {
        match self.checked(operation, accepted)?.1.as_ref() {
            Payload::Scalar(bits) => Ok(*bits),
            _ => Err(missing(operation)),
        }
    }

    fn extract_boxed(&self, operation: &'static str, accepted: &[TypeKind]) -> Result<Boxed> {
        match self.checked(operation, accepted)?.1.into_owned() {
            Payload::Boxed(boxed) => Ok(boxed),
            _ => Err(missing(operation)),
        }
    }

    /// Extract a `short`.
    pub fn extract_short(&self) -> Result<i16> {
        Ok(self.extract_scalar("extract_short", &[TypeKind::Short])? as u16 as i16)
    }

    /// Extract a `long`; an enum yields its ordinal.
    pub fn extract_long(&self) -> Result<i32> {
        Ok(self.extract_scalar("extract_long", &[TypeKind::Long, TypeKind::Enum])? as u32 as i32)
    }

    /// Extract an `unsigned short`.
    pub fn extract_ushort(&self) -> Result<u16> {
        Ok(self.extract_scalar("extract_ushort", &[TypeKind::UShort])? as u16)
    }

    /// Extract an `unsigned long`.
    pub fn extract_ulong(&self) -> Result<u32> {
        Ok(self.extract_scalar("extract_ulong", &[TypeKind::ULong])? as u32)
    }

    /// Extract a `long long`.
    pub fn extract_longlong(&self) -> Result<i64> {
        Ok(self.extract_scalar("extract_longlong", &[TypeKind::LongLong])? as i64)
    }

    /// Extract an `unsigned long long`.
    pub fn extract_ulonglong(&self) -> Result<u64> {
        self.extract_scalar("extract_ulonglong", &[TypeKind::ULongLong])
    }

    /// Extract a `float`.
    pub fn extract_float(&self) -> Result<f32> {
        let bits = self.extract_scalar("extract_float", &[TypeKind::Float])?;
        Ok(f32::from_bits(bits as u32))
    }

    /// Extract a `double`.
    pub fn extract_double(&self) -> Result<f64> {
        let bits = self.extract_scalar("extract_double", &[TypeKind::Double])?;
        Ok(f64::from_bits(bits))
    }

    /// Extract a `boolean`.
    pub fn extract_boolean(&self) -> Result<bool> {
        Ok(self.extract_scalar("extract_boolean", &[TypeKind::Boolean])? != 0)
    }

    /// Extract a `char`.
    pub fn extract_char(&self) -> Result<char> {
        crate::typecode::bits_to_char(self.extract_scalar("extract_char", &[TypeKind::Char])?)
    }

    /// Extract a `wchar`.
    pub fn extract_wchar(&self) -> Result<char> {
        crate::typecode::bits_to_char(self.extract_scalar("extract_wchar", &[TypeKind::WChar])?)
    }

    /// Extract an `octet`.
    pub fn extract_octet(&self) -> Result<u8> {
        Ok(self.extract_scalar("extract_octet", &[TypeKind::Octet])? as u8)
    }

    /// Extract a `string`.
    pub fn extract_string(&self) -> Result<String> {
        match self.extract_boxed("extract_string", &[TypeKind::String])? {
            Boxed::String(value) => Ok(value),
            _ => Err(missing("extract_string")),
        }
    }

    /// Extract a `wstring`.
    pub fn extract_wstring(&self) -> Result<String> {
        match self.extract_boxed("extract_wstring", &[TypeKind::WString])? {
            Boxed::String(value) => Ok(value),
            _ => Err(missing("extract_wstring")),
        }
    }

    /// Extract a nested Any.
    pub fn extract_any(&self) -> Result<Any> {
        match self.extract_boxed("extract_any", &[TypeKind::Any])? {
            Boxed::Any(value) => Ok(*value),
            _ => Err(missing("extract_any")),
        }
    }

    /// Extract a TypeCode.
    pub fn extract_type_code(&self) -> Result<TypeCode> {
        match self.extract_boxed("extract_type_code", &[TypeKind::TypeCode])? {
            Boxed::TypeCode(value) => Ok(value),
            _ => Err(missing("extract_type_code")),
        }
    }

    /// Extract an object reference, also from an abstract interface holding one.
    pub fn extract_object(&self) -> Result<ObjectRef> {
        let accepted = [TypeKind::ObjRef, TypeKind::AbstractInterface];
        match self.extract_boxed("extract_object", &accepted)? {
            Boxed::Object(object) => Ok(object),
            _ => Err(OrbError::bad_operation(
                "extract_object",
                "type mismatch: abstract interface holds a value",
            )),
        }
    }

    /// Extract a fixed-point decimal.
    pub fn extract_fixed(&self) -> Result<FixedDecimal> {
        match self.extract_boxed("extract_fixed", &[TypeKind::Fixed])? {
            Boxed::Fixed(value) => Ok(value),
            _ => Err(missing("extract_fixed")),
        }
    }

    /// Extract a value type instance; `None` is the null value.
    pub fn extract_value(&self) -> Result<Option<Arc<dyn CorbaValue>>> {
        let accepted = [
            TypeKind::Value,
            TypeKind::ValueBox,
            TypeKind::AbstractInterface,
        ];
        match self.extract_boxed("extract_value", &accepted)? {
            Boxed::Value(value) => Ok(value),
            _ => Err(OrbError::bad_operation(
                "extract_value",
                "type mismatch: abstract interface holds an object",
            )),
        }
    }

    /// Extract the octets of a Principal.
    pub fn extract_principal(&self) -> Result<Vec<u8>> {
        match self.checked("extract_principal", &[TypeKind::Principal])?.1.as_ref() {
            Payload::Streamed(stream) => stream.clone().read_octet_sequence(),
            _ => Err(missing("extract_principal")),
        }
    }
}

fn missing(operation: &'static str) -> OrbError {
    OrbError::bad_operation(operation, "Any holds no value")
}

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Any")
            .field("type_code", &self.type_code)
            .field("initialized", &self.initialized)
            .field("payload", &self.payload)
            .finish()
    }
}
