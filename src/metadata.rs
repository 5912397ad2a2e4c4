use crate::utils;

use std::collections::BTreeMap;

/// The scalar constants of a grid file.
///
/// The constants that describe the mesh topology have typed fields; every other scalar
/// found in the file (normalisations, `ZMIN`/`ZMAX`, version numbers, ...) is kept in
/// [`extra`](Self::extra). A fused dataset and each of its variables hold a shared
/// reference to one of these, so any variable can be asked which grid it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryMetadata {
    pub nx: Option<i64>,
    pub ny: Option<i64>,
    pub ny_inner: Option<i64>,
    pub y_boundary_guards: Option<i64>,
    pub ixseps1: Option<i64>,
    pub ixseps2: Option<i64>,
    pub jyseps1_1: Option<i64>,
    pub jyseps2_1: Option<i64>,
    pub jyseps1_2: Option<i64>,
    pub jyseps2_2: Option<i64>,
    /// scalars without a typed field, and typed ones that were not integers
    pub extra: BTreeMap<String, f64>,
}

impl GeometryMetadata {
    /// sort scalar constants into the typed fields and the extension map
    pub fn from_scalars<I: IntoIterator<Item = (String, f64)>>(scalars: I) -> Self {
        let mut metadata = Self::default();

        for (name, value) in scalars {
            if let (Some(integer), Some(slot)) = (utils::integral(value), metadata.field_mut(&name)) {
                *slot = Some(integer);
                continue;
            }

            metadata.extra.insert(name, value);
        }

        metadata
    }

    /// look up any constant by its name in the grid file
    pub fn get(&self, name: &str) -> Option<f64> {
        match self.field(name) {
            Some(Some(typed)) => Some(typed as f64),
            // a known constant that was not an integer lives in `extra`
            _ => self.extra.get(name).copied(),
        }
    }

    /// every constant, typed fields first, in a stable order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        let typed = Self::TYPED
            .iter()
            .filter_map(move |name| self.field(name).flatten().map(|v| (*name, v as f64)));

        typed.chain(self.extra.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    const TYPED: [&'static str; 10] = [
        "nx",
        "ny",
        "ny_inner",
        "y_boundary_guards",
        "ixseps1",
        "ixseps2",
        "jyseps1_1",
        "jyseps2_1",
        "jyseps1_2",
        "jyseps2_2",
    ];

    fn field(&self, name: &str) -> Option<Option<i64>> {
        let value = match name {
            "nx" => self.nx,
            "ny" => self.ny,
            "ny_inner" => self.ny_inner,
            "y_boundary_guards" => self.y_boundary_guards,
            "ixseps1" => self.ixseps1,
            "ixseps2" => self.ixseps2,
            "jyseps1_1" => self.jyseps1_1,
            "jyseps2_1" => self.jyseps2_1,
            "jyseps1_2" => self.jyseps1_2,
            "jyseps2_2" => self.jyseps2_2,
            _ => return None,
        };
        Some(value)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Option<i64>> {
        let slot = match name {
            "nx" => &mut self.nx,
            "ny" => &mut self.ny,
            "ny_inner" => &mut self.ny_inner,
            "y_boundary_guards" => &mut self.y_boundary_guards,
            "ixseps1" => &mut self.ixseps1,
            "ixseps2" => &mut self.ixseps2,
            "jyseps1_1" => &mut self.jyseps1_1,
            "jyseps2_1" => &mut self.jyseps2_1,
            "jyseps1_2" => &mut self.jyseps1_2,
            "jyseps2_2" => &mut self.jyseps2_2,
            _ => return None,
        };
        Some(slot)
    }
}
