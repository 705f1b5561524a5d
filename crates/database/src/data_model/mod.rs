use trips::MappingError;

pub mod trip;

pub trait DatabaseRow {
    type Model;

    fn to_model(self) -> Result<Self::Model, MappingError>;
}

/// Converts all rows, failing on the first row that can not be mapped.
pub fn to_models<R: DatabaseRow>(rows: Vec<R>) -> Result<Vec<R::Model>, MappingError> {
    rows.into_iter().map(R::to_model).collect()
}
