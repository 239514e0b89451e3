// ABOUTME: Immutable constraint descriptors and a batch builder.
// ABOUTME: A constraint reads item.attribute = multiplier * target.attribute + constant.

use crate::tree::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Left,
    Right,
    Top,
    Bottom,
    Leading,
    Trailing,
    Width,
    Height,
    CenterX,
    CenterY,
    /// Placeholder target attribute for constant size constraints
    NotAnAttribute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Horizontal,
    Vertical,
}

impl Attribute {
    pub(crate) fn axis(self) -> Option<Axis> {
        match self {
            Attribute::Left
            | Attribute::Right
            | Attribute::Leading
            | Attribute::Trailing
            | Attribute::Width
            | Attribute::CenterX => Some(Axis::Horizontal),
            Attribute::Top | Attribute::Bottom | Attribute::Height | Attribute::CenterY => {
                Some(Axis::Vertical)
            }
            Attribute::NotAnAttribute => None,
        }
    }

    pub fn is_size(self) -> bool {
        matches!(self, Attribute::Width | Attribute::Height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessThanOrEqual,
    Equal,
    GreaterThanOrEqual,
}

impl Relation {
    /// Same relation read from the other side
    pub fn flipped(self) -> Self {
        match self {
            Relation::LessThanOrEqual => Relation::GreaterThanOrEqual,
            Relation::Equal => Relation::Equal,
            Relation::GreaterThanOrEqual => Relation::LessThanOrEqual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub item: ViewId,
    pub attribute: Attribute,
    pub relation: Relation,
    pub target: Option<ViewId>,
    pub target_attribute: Attribute,
    pub multiplier: f64,
    pub constant: f64,
}

impl Constraint {
    /// `item.attribute == target.target_attribute`, multiplier 1, constant 0
    pub fn equal(item: ViewId, attribute: Attribute, target: ViewId, target_attribute: Attribute) -> Self {
        Self {
            item,
            attribute,
            relation: Relation::Equal,
            target: Some(target),
            target_attribute,
            multiplier: 1.0,
            constant: 0.0,
        }
    }

    /// `item.attribute == target.attribute`
    pub fn align(item: ViewId, target: ViewId, attribute: Attribute) -> Self {
        Self::equal(item, attribute, target, attribute)
    }

    /// `item.attribute == constant` for a size attribute
    pub fn fixed(item: ViewId, attribute: Attribute, constant: f64) -> Self {
        Self {
            item,
            attribute,
            relation: Relation::Equal,
            target: None,
            target_attribute: Attribute::NotAnAttribute,
            multiplier: 1.0,
            constant,
        }
    }

    pub fn multiplied_by(self, multiplier: f64) -> Self {
        Self { multiplier, ..self }
    }

    pub fn offset_by(self, constant: f64) -> Self {
        Self { constant, ..self }
    }

    pub fn with_relation(self, relation: Relation) -> Self {
        Self { relation, ..self }
    }

    /// True when `other` says exactly what `self` says, either verbatim or,
    /// for unit multipliers, written from the target's side.
    pub fn restates(&self, other: &Constraint) -> bool {
        if self == other {
            return true;
        }
        let Some(target) = self.target else {
            return false;
        };
        self.multiplier == 1.0
            && other.multiplier == 1.0
            && other.item == target
            && other.attribute == self.target_attribute
            && other.target == Some(self.item)
            && other.target_attribute == self.attribute
            && other.constant == -self.constant
            && other.relation == self.relation.flipped()
    }
}

/// Constraints that are installed together in one layout phase
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintBatch {
    pub name: &'static str,
    pub constraints: Vec<Constraint>,
}

impl ConstraintBatch {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            constraints: Vec::new(),
        }
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn extend(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Pin top, leading, trailing and bottom of `item` to the same edges of `target`
    pub fn pin_edges(self, item: ViewId, target: ViewId) -> Self {
        self.extend([
            Attribute::Top,
            Attribute::Leading,
            Attribute::Trailing,
            Attribute::Bottom,
        ]
        .map(|attribute| Constraint::align(item, target, attribute)))
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
