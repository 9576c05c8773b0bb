use super::{
    Field, FieldId, FieldKind, Model, ModelId, Name, OnDelete, RelKind, Relation, Schema,
};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::collections::HashMap;

/// Number of numbered names tried for a synthesized reverse field once the
/// plain name is taken.
const REVERSE_NAME_ATTEMPTS: usize = 5;

/// Resolves relations across the registered models and produces the schema.
///
/// Runs four passes, each over every model:
///
/// 1. link each relation and reverse field to its target model, finalize
///    foreign-key columns and find or synthesize many-to-many junction models;
/// 2. synthesize reverse fields on targets that have none pointing back;
/// 3. link many-to-many fields to the two junction columns;
/// 4. pair every reverse field with its forward field.
pub(super) fn resolve(
    models: Vec<Model>,
    by_table: IndexMap<String, ModelId>,
    by_full_name: HashMap<String, ModelId>,
) -> Result<Schema> {
    let mut resolver = Resolver {
        models,
        by_table,
        by_full_name,
    };

    resolver.link_targets()?;
    resolver.synthesize_reverse()?;
    resolver.link_junctions()?;
    resolver.pair_reverse()?;

    Ok(Schema {
        models: resolver.models,
        by_table: resolver.by_table,
        by_full_name: resolver.by_full_name,
    })
}

struct Resolver {
    models: Vec<Model>,
    by_table: IndexMap<String, ModelId>,
    by_full_name: HashMap<String, ModelId>,
}

/// What junction synthesis needs to know about one side of the relation.
struct Side {
    id: ModelId,
    table: String,
    full_name: String,
    pk_column: String,
}

impl Resolver {
    fn link_targets(&mut self) -> Result<()> {
        // Junction models appended below arrive fully linked.
        let count = self.models.len();

        for model_index in 0..count {
            for field_index in 0..self.models[model_index].fields.len() {
                let id = ModelId(model_index).field(field_index);

                let (kind, target_path) = match &self.field(id).relation {
                    Some(relation) => (relation.kind, relation.target_path.clone()),
                    None => continue,
                };

                let target = self.by_full_name.get(&target_path).copied().ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "can not find rel in field `{}`, `{target_path}` may be missing registration",
                        self.field(id).full_name
                    ))
                })?;

                self.relation_mut(id).target = Some(target);

                match kind {
                    RelKind::ForeignKey | RelKind::OneToOne => self.link_column(id, target)?,
                    RelKind::ManyToMany => self.link_through(id, target)?,
                    RelKind::ReverseOne | RelKind::ReverseMany => {}
                }
            }
        }

        Ok(())
    }

    /// A foreign-key column is named after the field and the target's
    /// primary key column, unless the column was named explicitly.
    fn link_column(&mut self, id: FieldId, target: ModelId) -> Result<()> {
        let field = self.field(id);
        let target = &self.models[target.0];

        let [pk] = target.primary_key[..] else {
            return Err(Error::invalid_schema(format!(
                "field `{}` relates to `{}`, which must have exactly one primary key",
                field.full_name, target.full_name
            )));
        };

        if field.explicit_column {
            return Ok(());
        }

        let column = format!(
            "{}_{}",
            Name::new(&field.name).snake_case(),
            target.fields[pk].column
        );

        let duplicate = self.models[id.model.0]
            .fields
            .iter()
            .any(|other| other.id != id && other.is_db_column() && other.column == column);

        if duplicate {
            return Err(Error::invalid_schema(format!("duplicate column name: {column}"))
                .context(format!("field `{}`", field.full_name)));
        }

        self.field_mut(id).column = column;
        Ok(())
    }

    fn link_through(&mut self, id: FieldId, target: ModelId) -> Result<()> {
        let field = self.field(id);
        let relation = field.expect_relation();
        let rel_through = relation.rel_through.clone();
        let rel_table = relation.rel_table.clone();

        let through = match rel_through {
            Some(path) => {
                let valid = path.rfind('.').is_some_and(|i| i > 0 && i + 1 < path.len());
                let found = valid.then(|| self.by_full_name.get(&path)).flatten();

                match found {
                    Some(through) => *through,
                    None => {
                        return Err(Error::invalid_schema(format!(
                            "field `{}` wrong rel_through value `{path}`",
                            self.field(id).full_name
                        )))
                    }
                }
            }
            None => self.synthesize_junction(id.model, target, rel_table)?,
        };

        let junction = &mut self.models[through.0];
        junction.is_through = true;
        let table = junction.table.clone();

        let relation = self.relation_mut(id);
        relation.through = Some(through);
        relation.rel_table = Some(table);
        Ok(())
    }

    fn synthesize_junction(
        &mut self,
        owner: ModelId,
        target: ModelId,
        rel_table: Option<String>,
    ) -> Result<ModelId> {
        let owner_model = &self.models[owner.0];
        let target_model = &self.models[target.0];

        let (&[owner_pk], &[target_pk]) = (&owner_model.primary_key[..], &target_model.primary_key[..])
        else {
            return Err(Error::invalid_schema(format!(
                "many-to-many models ({}, {}) must have one primary key",
                owner_model.table, target_model.table
            )));
        };

        let sides = [
            Side {
                id: owner,
                table: owner_model.table.clone(),
                full_name: owner_model.full_name.clone(),
                pk_column: owner_model.fields[owner_pk].column.clone(),
            },
            Side {
                id: target,
                table: target_model.table.clone(),
                full_name: target_model.full_name.clone(),
                pk_column: target_model.fields[target_pk].column.clone(),
            },
        ];

        let package = owner_model.package.clone();
        let schema_name = owner_model.schema_name.clone();

        let table = rel_table.unwrap_or_else(|| format!("{}_{}", sides[0].table, sides[1].table));
        if self.by_table.contains_key(&table) {
            return Err(Error::invalid_schema(format!(
                "the rel table name `{table}` already registered, cannot be used, please change one"
            )));
        }

        let name = Name::new(&table).upper_camel_case();
        let id = ModelId(self.models.len());

        let mut junction = Model::new(id, &package, &name, table.clone());
        junction.manual = false;
        junction.is_through = true;
        junction.schema_name = schema_name;

        if self.by_full_name.contains_key(&junction.full_name) {
            return Err(Error::invalid_schema(format!(
                "model `{}` registered more than once, must be unique",
                junction.full_name
            )));
        }

        let self_referential = owner == target;

        for (side, prefix) in sides.iter().zip(["from", "to"]) {
            let base = Name::new(&side.table);

            let (field_name, column) = if self_referential {
                (
                    format!("{}{}", Name::new(prefix).upper_camel_case(), base.upper_camel_case()),
                    format!("{prefix}_{}_{}", side.table, side.pk_column),
                )
            } else {
                (
                    base.upper_camel_case(),
                    format!("{}_{}", side.table, side.pk_column),
                )
            };

            let mut relation = Relation::new(RelKind::ForeignKey, &side.full_name);
            relation.target = Some(side.id);
            relation.on_delete = Some(OnDelete::Cascade);

            let mut field = Field::new(
                id.field(0),
                &field_name,
                column,
                FieldKind::Relation(RelKind::ForeignKey),
            );
            field.full_name = format!("{}.{field_name}", junction.full_name);
            field.explicit_column = true;
            field.primary_key = true;
            field.relation = Some(relation);

            junction.add_field(field)?;
        }

        tracing::debug!(
            table = %junction.table,
            model = %junction.full_name,
            "synthesized junction model"
        );

        self.by_table.insert(table, id);
        self.by_full_name.insert(junction.full_name.clone(), id);
        self.models.push(junction);

        Ok(id)
    }

    fn synthesize_reverse(&mut self) -> Result<()> {
        for model_index in 0..self.models.len() {
            let source = ModelId(model_index);

            for field_index in 0..self.models[model_index].fields.len() {
                let field = &self.models[model_index].fields[field_index];

                let Some(kind) = field.rel_kind().filter(|kind| kind.is_forward()) else {
                    continue;
                };

                let target = field.expect_relation().expect_target();

                let has_reverse = self.models[target.0].fields.iter().any(|other| {
                    other.is_reverse()
                        && other.relation.as_ref().and_then(|relation| relation.target)
                            == Some(source)
                });

                if !has_reverse {
                    let forward = field.full_name.clone();
                    self.add_reverse(source, target, kind, &forward)?;
                }
            }
        }

        Ok(())
    }

    /// Adds a reverse field named after the source type. If the name is taken,
    /// numbered variants are tried.
    fn add_reverse(
        &mut self,
        source: ModelId,
        target: ModelId,
        kind: RelKind,
        forward: &str,
    ) -> Result<()> {
        let rev_kind = match kind {
            RelKind::OneToOne => RelKind::ReverseOne,
            _ => RelKind::ReverseMany,
        };

        let base = self.models[source.0].name.clone();
        let source_full_name = self.models[source.0].full_name.clone();
        let target_model = &mut self.models[target.0];

        let candidates = std::iter::once(base.clone())
            .chain((0..REVERSE_NAME_ATTEMPTS).map(|n| format!("{base}{n}")));

        for name in candidates {
            if target_model.field_by_name(&name).is_some() {
                continue;
            }

            let mut relation = Relation::new(rev_kind, &source_full_name);
            relation.target = Some(source);

            let mut field = Field::new(
                target.field(0),
                &name,
                Name::new(&name).snake_case(),
                FieldKind::Relation(rev_kind),
            );
            field.full_name = format!("{}.{name}", target_model.full_name);
            field.relation = Some(relation);

            tracing::debug!(
                model = %target_model.full_name,
                field = %name,
                forward,
                "synthesized reverse field"
            );

            target_model.add_field(field)?;
            return Ok(());
        }

        Err(Error::invalid_schema(format!(
            "cannot generate reverse field for `{forward}` on `{}`",
            target_model.full_name
        )))
    }

    fn link_junctions(&mut self) -> Result<()> {
        for model_index in 0..self.models.len() {
            let owner = ModelId(model_index);

            for field_index in 0..self.models[model_index].fields.len() {
                let id = owner.field(field_index);
                let field = self.field(id);

                if field.rel_kind() != Some(RelKind::ManyToMany) {
                    continue;
                }

                let relation = field.expect_relation();
                let target = relation.expect_target();
                let junction = &self.models[relation.expect_through().0];

                let links: Vec<(FieldId, ModelId)> = junction
                    .fields
                    .iter()
                    .filter(|f| f.rel_kind().is_some_and(RelKind::has_column))
                    .map(|f| (f.id, f.expect_relation().expect_target()))
                    .collect();

                let pair = links
                    .iter()
                    .find(|(_, to)| *to == owner)
                    .map(|(link, _)| *link);

                // A self-referential junction links the same model twice; the
                // target side is the link not already taken by the owner.
                let target_link = links
                    .iter()
                    .find(|(link, to)| *to == target && Some(*link) != pair)
                    .or_else(|| links.iter().find(|(_, to)| *to == target))
                    .map(|(link, _)| *link);

                let (Some(pair), Some(target_link)) = (pair, target_link) else {
                    return Err(Error::invalid_schema(format!(
                        "can not find m2m field for m2m model `{}`, ensure your m2m model defined correct",
                        junction.full_name
                    )));
                };

                let relation = self.relation_mut(id);
                relation.pair = Some(pair);
                relation.target_link = Some(target_link);
            }
        }

        Ok(())
    }

    fn pair_reverse(&mut self) -> Result<()> {
        for model_index in 0..self.models.len() {
            let owner = ModelId(model_index);

            for field_index in 0..self.models[model_index].fields.len() {
                let id = owner.field(field_index);

                match self.field(id).rel_kind() {
                    Some(RelKind::ReverseOne) => {
                        self.pair_with_forward(id, RelKind::OneToOne)?;
                    }
                    Some(RelKind::ReverseMany) => {
                        if !self.pair_with_forward(id, RelKind::ForeignKey)? {
                            self.pair_with_many_to_many(id)?;
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Pairs a reverse field with the first unpaired forward field of `kind`
    /// on the target pointing back at the reverse field's model.
    ///
    /// A reverse-one field must find its one-to-one field; a reverse-many field
    /// falls back to many-to-many pairing, so only returns whether it found one.
    fn pair_with_forward(&mut self, id: FieldId, kind: RelKind) -> Result<bool> {
        let reverse = self.field(id);
        let target = reverse.expect_relation().expect_target();

        let forward = self.models[target.0]
            .relations(kind)
            .find(|field| {
                let relation = field.expect_relation();
                relation.target == Some(id.model) && relation.pair.is_none()
            })
            .map(|field| field.id);

        match forward {
            Some(forward) => {
                self.relation_mut(id).pair = Some(forward);
                self.relation_mut(forward).pair = Some(id);
                Ok(true)
            }
            None if kind == RelKind::OneToOne => Err(Error::invalid_schema(format!(
                "reverse field `{}` not found in model `{}`",
                reverse.full_name, self.models[target.0].full_name
            ))),
            None => Ok(false),
        }
    }

    fn pair_with_many_to_many(&mut self, id: FieldId) -> Result<()> {
        let reverse = self.field(id);
        let relation = reverse.expect_relation();
        let target = relation.expect_target();

        let candidate = self.models[target.0]
            .relations(RelKind::ManyToMany)
            .find(|field| {
                let m2m = field.expect_relation();

                let same_junction = match (&relation.rel_through, &relation.rel_table) {
                    (Some(through), _) if m2m.rel_through.as_ref() == Some(through) => true,
                    (_, Some(table)) if m2m.rel_table.as_ref() == Some(table) => true,
                    (None, None) => true,
                    _ => false,
                };

                m2m.target == Some(id.model) && m2m.m2m_pair.is_none() && same_junction
            })
            .map(|field| (field.id, field.expect_relation().clone()));

        let Some((m2m_id, m2m)) = candidate else {
            return Err(Error::invalid_schema(format!(
                "reverse field for `{}` not found in model `{}`",
                reverse.full_name, self.models[target.0].full_name
            )));
        };

        let relation = self.relation_mut(id);
        relation.pair = m2m.target_link;
        relation.target_link = m2m.pair;
        relation.through = m2m.through;
        relation.rel_table = m2m.rel_table;
        relation.m2m_pair = Some(m2m_id);

        self.relation_mut(m2m_id).m2m_pair = Some(id);
        Ok(())
    }

    fn field(&self, id: FieldId) -> &Field {
        &self.models[id.model.0].fields[id.index]
    }

    fn field_mut(&mut self, id: FieldId) -> &mut Field {
        &mut self.models[id.model.0].fields[id.index]
    }

    fn relation_mut(&mut self, id: FieldId) -> &mut Relation {
        self.field_mut(id).expect_relation_mut()
    }
}
