use crate::{ModelDef, Record};

/// A type stored in a table.
///
/// The definition returned by [`Model::schema`] is reflected into a model
/// when the type is registered with [`crate::db::Builder::register`]. Field
/// values move in and out through [`Record`], keyed by the field names the
/// definition declares.
pub trait Model: Record + Default + Send + Sync + 'static {
    fn schema() -> ModelDef;
}

/// Implements [`Record`] for a struct by mapping field names to struct
/// members.
///
/// Each member type converts into a [`crate::Value`] and back through
/// [`crate::FromValue`]. Relation fields hold the related primary key.
///
/// ```
/// #[derive(Debug, Default)]
/// struct User {
///     id: Option<i64>,
///     name: String,
/// }
///
/// rivet::record!(User {
///     id: "ID",
///     name: "Name",
/// });
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $( $member:ident : $field:literal ),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn get(&self, field: &str) -> ::std::option::Option<$crate::Value> {
                match field {
                    $( $field => ::std::option::Option::Some($crate::Value::from(self.$member.clone())), )*
                    _ => ::std::option::Option::None,
                }
            }

            fn set(&mut self, field: &str, value: $crate::Value) -> $crate::Result<()> {
                match field {
                    $(
                        $field => {
                            self.$member = $crate::FromValue::from_value(value)?;
                            ::std::result::Result::Ok(())
                        }
                    )*
                    _ => ::std::result::Result::Err($crate::Error::invalid_statement(format!(
                        "`{}` has no field `{field}`",
                        stringify!($ty)
                    ))),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Record, Value};

    #[derive(Debug, Default)]
    struct Point {
        id: Option<i64>,
        label: String,
    }

    crate::record!(Point {
        id: "ID",
        label: "Label",
    });

    #[test]
    fn maps_field_names_to_members() {
        let mut point = Point::default();
        assert_eq!(point.get("ID"), Some(Value::Null));

        point.set("ID", Value::I64(4)).unwrap();
        point.set("Label", Value::from("north")).unwrap();
        assert_eq!(point.id, Some(4));
        assert_eq!(point.get("Label"), Some(Value::from("north")));
        assert_eq!(point.get("label"), None);
    }

    #[test]
    fn rejects_unknown_fields_and_bad_values() {
        let mut point = Point::default();
        assert!(point.set("Missing", Value::I64(1)).unwrap_err().is_invalid_statement());
        assert!(point.set("ID", Value::Bool(true)).is_err());
    }
}
