//! selecting, concatenating and merging datasets

use super::{Dataset, DatasetError, Dim, Variable};

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

impl Dataset {
    /// select the index `range` along `dim` from every variable and coordinate that
    /// depends on it
    pub fn isel(&self, dim: Dim, range: Range<usize>) -> Result<Dataset, DatasetError> {
        let len = self.len_of(dim).ok_or(DatasetError::MissingDimension { dim })?;

        if range.start > range.end || range.end > len {
            return Err(DatasetError::SliceOutOfBounds {
                dim,
                start: range.start,
                end: range.end,
                len,
            });
        }

        let select = |vars: &BTreeMap<String, Variable>| -> BTreeMap<String, Variable> {
            vars.iter()
                .map(|(name, var)| (name.clone(), var.isel(dim, range.clone())))
                .collect()
        };

        Ok(Dataset {
            variables: select(&self.variables),
            coords: select(&self.coords),
            attrs: self.attrs.clone(),
            metadata: self.metadata.clone(),
            grid: self.grid.clone(),
        })
    }

    /// join `self` and `other` end to end along `dim`
    ///
    /// Only variables that depend on `dim` are concatenated. Everything else (variables,
    /// coordinates, attributes, metadata) has to be identical in both datasets, and both
    /// must hold the same set of variable names.
    pub fn concat(&self, other: &Dataset, dim: Dim) -> Result<Dataset, DatasetError> {
        if self.attrs != other.attrs {
            return Err(DatasetError::ConcatConflict {
                name: "<attributes>".into(),
                reason: "dataset attributes are not identical",
            });
        }

        if self.metadata != other.metadata || self.grid != other.grid {
            return Err(DatasetError::ConcatConflict {
                name: "<metadata>".into(),
                reason: "dataset metadata is not identical",
            });
        }

        Ok(Dataset {
            variables: concat_variables(&self.variables, &other.variables, dim)?,
            coords: concat_variables(&self.coords, &other.coords, dim)?,
            attrs: self.attrs.clone(),
            metadata: self.metadata.clone(),
            grid: self.grid.clone(),
        })
    }

    /// union of the variables of both datasets
    ///
    /// Shared dimensions must have the same length and a variable present in both
    /// datasets must be identical in both. Attributes and metadata entries are unioned,
    /// keeping the value from `self` where a key is present in both.
    pub fn merge(self, other: Dataset) -> Result<Dataset, DatasetError> {
        let sizes = self.sizes();
        for (dim, actual) in other.sizes() {
            if let Some(expected) = sizes.get(&dim) {
                if *expected != actual {
                    let name = other
                        .variables
                        .iter()
                        .chain(other.coords.iter())
                        .find(|(_, var)| var.axis_of(dim).is_some())
                        .map(|(name, _)| name.clone())
                        .unwrap_or_default();

                    return Err(DatasetError::DimensionSizeConflict {
                        name,
                        dim,
                        expected: *expected,
                        actual,
                    });
                }
            }
        }

        let Dataset {
            variables,
            coords,
            attrs,
            metadata,
            grid,
        } = other;

        let mut merged = self;

        union_variables(&mut merged.variables, variables)?;
        union_variables(&mut merged.coords, coords)?;

        for (key, value) in attrs {
            merged.attrs.entry(key).or_insert(value);
        }

        merged.metadata.extend_missing(metadata);

        if merged.grid.is_none() {
            merged.grid = grid;
        }

        Ok(merged)
    }

    /// remove every data variable and coordinate that depends on any of `dims`
    pub fn drop_dims(mut self, dims: &BTreeSet<Dim>) -> Dataset {
        let keep = |var: &Variable| !var.dims().iter().any(|dim| dims.contains(dim));
        self.variables.retain(|_, var| keep(var));
        self.coords.retain(|_, var| keep(var));
        self
    }
}

fn concat_variables(
    left: &BTreeMap<String, Variable>,
    right: &BTreeMap<String, Variable>,
    dim: Dim,
) -> Result<BTreeMap<String, Variable>, DatasetError> {
    if let Some(name) = left
        .keys()
        .filter(|name| !right.contains_key(*name))
        .chain(right.keys().filter(|name| !left.contains_key(*name)))
        .next()
    {
        return Err(DatasetError::ConcatConflict {
            name: name.clone(),
            reason: "present in only one of the datasets",
        });
    }

    let mut out = BTreeMap::new();

    for (name, lhs) in left {
        // key sets were checked above
        let rhs = &right[name];

        let joined = if lhs.axis_of(dim).is_some() {
            lhs.concatenate(rhs, dim).ok_or_else(|| DatasetError::ConcatConflict {
                name: name.clone(),
                reason: "dimensions, attributes or lengths of the pieces differ",
            })?
        } else if lhs.identical(rhs) {
            lhs.clone()
        } else {
            return Err(DatasetError::ConcatConflict {
                name: name.clone(),
                reason: "variable does not depend on the concatenation dimension and is not identical in both pieces",
            });
        };

        out.insert(name.clone(), joined);
    }

    Ok(out)
}

fn union_variables(
    into: &mut BTreeMap<String, Variable>,
    from: BTreeMap<String, Variable>,
) -> Result<(), DatasetError> {
    for (name, var) in from {
        match into.get(&name) {
            Some(existing) if !existing.identical(&var) => {
                return Err(DatasetError::MergeConflict { name });
            }
            Some(_) => {}
            None => {
                into.insert(name, var);
            }
        }
    }

    Ok(())
}
