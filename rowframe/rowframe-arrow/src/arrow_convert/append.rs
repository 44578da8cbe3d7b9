use arrow::{
    array::{
        ArrayBuilder, BooleanBuilder, Float64Builder, Int64Builder, ListBuilder, NullBuilder,
        StringBuilder, StructBuilder,
    },
    datatypes::DataType,
    error::ArrowError,
};
use rowframe_core::Value;

use super::scalar::{ScalarValue, scalar_value_for_datatype};
use crate::error::ArrowConvertError;

macro_rules! cast_builder {
    ($b:expr, $T:ty) => {
        $b.as_any_mut()
            .downcast_mut::<$T>()
            .ok_or_else(|| ArrowConvertError::builder(stringify!($T)))?
    };
}

fn append_scalar_dyn(
    builder: &mut Box<dyn ArrayBuilder>,
    scalar: &ScalarValue<'_>,
) -> Result<(), ArrowConvertError> {
    match scalar {
        ScalarValue::Null => cast_builder!(builder, NullBuilder).append_null(),
        ScalarValue::Boolean(v) => cast_builder!(builder, BooleanBuilder).append_option(*v),
        ScalarValue::Int64(v) => cast_builder!(builder, Int64Builder).append_option(*v),
        ScalarValue::Float64(v) => cast_builder!(builder, Float64Builder).append_option(*v),
        ScalarValue::Utf8(v) => cast_builder!(builder, StringBuilder).append_option(*v),
    }
    Ok(())
}

fn append_list_elements(
    child_builder: &mut Box<dyn ArrayBuilder>,
    elem_dt: &DataType,
    value: &Value,
) -> Result<bool, ArrowConvertError> {
    match value {
        Value::List(items) => {
            for item in items {
                append_value_to_builder(child_builder, elem_dt, item)?;
            }
            Ok(true)
        }
        Value::Null => Ok(false),
        _ => Err(value.type_mismatch("array").into()),
    }
}

pub(super) fn append_value_to_builder(
    builder: &mut Box<dyn ArrayBuilder>,
    dt: &DataType,
    value: &Value,
) -> Result<(), ArrowConvertError> {
    if let Some(scalar) = scalar_value_for_datatype(dt, value)? {
        return append_scalar_dyn(builder, &scalar);
    }

    match dt {
        DataType::List(field) => {
            let b = cast_builder!(builder, ListBuilder<Box<dyn ArrayBuilder>>);
            let valid = append_list_elements(b.values(), field.data_type(), value)?;
            b.append(valid);
        }
        DataType::Struct(fields) => {
            let b = cast_builder!(builder, StructBuilder);
            match value {
                Value::Struct(children) => {
                    for (i, field) in fields.iter().enumerate() {
                        let child_value = children.get(i).unwrap_or(&Value::Null);
                        append_value_to_struct_field(b, i, field.data_type(), child_value)?;
                    }
                    b.append(true);
                }
                Value::Null => {
                    for (i, field) in fields.iter().enumerate() {
                        append_value_to_struct_field(b, i, field.data_type(), &Value::Null)?;
                    }
                    b.append(false);
                }
                _ => return Err(value.type_mismatch("struct").into()),
            }
        }
        other => {
            return Err(ArrowError::NotYetImplemented(format!(
                "unsupported DataType in append_value_to_builder: {other}"
            ))
            .into());
        }
    }
    Ok(())
}

fn append_value_to_struct_field(
    sb: &mut StructBuilder,
    index: usize,
    dt: &DataType,
    value: &Value,
) -> Result<(), ArrowConvertError> {
    append_value_to_builder(&mut sb.field_builders_mut()[index], dt, value)
}
