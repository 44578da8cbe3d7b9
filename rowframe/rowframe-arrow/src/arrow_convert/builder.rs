use arrow::{
    array::{
        ArrayBuilder, BooleanBuilder, Float64Builder, Int64Builder, ListBuilder, NullBuilder,
        StringBuilder, StructBuilder,
    },
    datatypes::{DataType, Field},
    error::ArrowError,
};

pub(super) fn make_builder(
    dt: &DataType,
    capacity: usize,
) -> Result<Box<dyn ArrayBuilder>, ArrowError> {
    Ok(match dt {
        DataType::Null => Box::new(NullBuilder::new()),
        DataType::Boolean => Box::new(BooleanBuilder::with_capacity(capacity)),
        DataType::Int64 => Box::new(Int64Builder::with_capacity(capacity)),
        DataType::Float64 => Box::new(Float64Builder::with_capacity(capacity)),
        DataType::Utf8 => Box::new(StringBuilder::with_capacity(capacity, 64)),
        DataType::List(field) => {
            let child = make_builder(field.data_type(), capacity)?;
            Box::new(ListBuilder::new(child).with_field(field.clone()))
        }
        DataType::Struct(fields) => {
            let child_builders = fields
                .iter()
                .map(|f| make_builder(f.data_type(), capacity))
                .collect::<Result<Vec<_>, _>>()?;
            let fields_vec: Vec<Field> = fields.iter().map(|f| f.as_ref().clone()).collect();
            Box::new(StructBuilder::new(fields_vec, child_builders))
        }
        other => {
            return Err(ArrowError::NotYetImplemented(format!(
                "unsupported DataType for builder: {other}"
            )));
        }
    })
}
