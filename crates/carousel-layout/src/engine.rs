// ABOUTME: Constraint solver that turns installed constraints into view frames.
// ABOUTME: Descriptors become cassowary constraints; unconstrained values are held by weak stays.

use cassowary::strength::{MEDIUM, REQUIRED, STRONG};
use cassowary::{Expression, RelationalOperator, Solver, Term, Variable};

use carousel_core::{Color, Rect, Size};

use crate::constraint::{Attribute, Constraint, ConstraintBatch, ConstraintId, Relation};
use crate::tree::{ViewId, ViewKind, ViewTree};
use crate::LayoutError;

type SolverConstraint = cassowary::Constraint;

/// How far every stay is nudged when probing for views the constraints leave open
const NUDGE: f64 = 1.0;

/// A solved value that moves less than this under the nudge counts as pinned
const MOVE_EPSILON: f64 = 1e-6;

/// Solver unknowns for one view; content extents only matter for scroll views
#[derive(Clone, Copy)]
struct ViewVars {
    x: Variable,
    y: Variable,
    width: Variable,
    height: Variable,
    content_width: Variable,
    content_height: Variable,
}

impl ViewVars {
    fn new() -> Self {
        Self {
            x: Variable::new(),
            y: Variable::new(),
            width: Variable::new(),
            height: Variable::new(),
            content_width: Variable::new(),
            content_height: Variable::new(),
        }
    }
}

/// Weak pull toward a view's current value for an unknown nothing else decides
#[derive(Clone, Copy)]
struct Stay {
    variable: Variable,
    value: f64,
    strength: f64,
}

/// Deeper views hold their values ten times more loosely per level, so a free
/// ancestor is not resized to suit a descendant. Within a view, content size
/// gives way before position and position before size.
fn stay_strength(depth: usize, weight: f64) -> f64 {
    MEDIUM * weight * 0.1f64.powi(depth as i32)
}

const SIZE_WEIGHT: f64 = 3.0;
const POSITION_WEIGHT: f64 = 2.0;
const CONTENT_WEIGHT: f64 = 1.0;

/// Drops pivoting noise below a micro-pixel
fn snap(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn expr(terms: Vec<Term>, constant: f64) -> Expression {
    Expression::new(terms, constant)
}

fn operator(relation: Relation) -> RelationalOperator {
    match relation {
        Relation::LessThanOrEqual => RelationalOperator::LessOrEqual,
        Relation::Equal => RelationalOperator::Equal,
        Relation::GreaterThanOrEqual => RelationalOperator::GreaterOrEqual,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Solved {
    frame: Rect,
    content_size: Size,
}

fn read(solver: &Solver, vars: &[ViewVars]) -> Vec<Solved> {
    vars.iter()
        .map(|v| Solved {
            frame: Rect::new(
                solver.get_value(v.x),
                solver.get_value(v.y),
                solver.get_value(v.width),
                solver.get_value(v.height),
            ),
            content_size: Size::new(
                solver.get_value(v.content_width),
                solver.get_value(v.content_height),
            ),
        })
        .collect()
}

fn moved(a: &Rect, b: &Rect) -> bool {
    [a.x - b.x, a.y - b.y, a.width - b.width, a.height - b.height]
        .iter()
        .any(|delta| delta.abs() > MOVE_EPSILON)
}

/// Outcome of the last layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutReport {
    /// Constraints skipped because they contradict earlier ones
    pub conflicts: Vec<ConstraintId>,
    /// Constraints that restate an earlier one (harmless)
    pub redundant: Vec<ConstraintId>,
    /// Views whose frame is not fully determined and kept its current values
    pub ambiguous: Vec<ViewId>,
}

impl LayoutReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.ambiguous.is_empty()
    }
}

#[derive(Debug)]
pub struct LayoutEngine {
    tree: ViewTree,
    constraints: Vec<Constraint>,
    needs_layout: bool,
    last_report: LayoutReport,
}

impl LayoutEngine {
    pub fn new(root_size: Size) -> Self {
        Self {
            tree: ViewTree::new(root_size),
            constraints: Vec::new(),
            needs_layout: true,
            last_report: LayoutReport::default(),
        }
    }

    pub fn root(&self) -> ViewId {
        self.tree.root()
    }

    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    /// Direct access for non-layout properties (center, offsets, colors)
    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn last_report(&self) -> &LayoutReport {
        &self.last_report
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    pub fn set_needs_layout(&mut self) {
        self.needs_layout = true;
    }

    pub fn add_view(
        &mut self,
        parent: ViewId,
        kind: ViewKind,
        background: Color,
    ) -> Result<ViewId, LayoutError> {
        let id = self.tree.add_child(parent, kind, background)?;
        self.needs_layout = true;
        Ok(id)
    }

    pub fn set_root_size(&mut self, size: Size) {
        let root = self.tree.root();
        if self.tree.frame(root).map(|f| f.size()) != Some(size) {
            if let Some(view) = self.tree.get_mut(root) {
                view.frame = Rect::from_size(size);
            }
            self.needs_layout = true;
        }
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, LayoutError> {
        self.validate(&constraint)?;
        self.constraints.push(constraint);
        self.needs_layout = true;
        Ok(ConstraintId(self.constraints.len() - 1))
    }

    /// Install a whole batch; nothing is installed if any descriptor is malformed
    pub fn add_constraints(&mut self, batch: &ConstraintBatch) -> Result<Vec<ConstraintId>, LayoutError> {
        for constraint in &batch.constraints {
            self.validate(constraint)?;
        }
        let first = self.constraints.len();
        self.constraints.extend(batch.constraints.iter().copied());
        self.needs_layout = true;
        tracing::debug!("Installed {} constraints for {}", batch.len(), batch.name);
        Ok((first..self.constraints.len()).map(ConstraintId).collect())
    }

    fn validate(&self, constraint: &Constraint) -> Result<(), LayoutError> {
        if !self.tree.contains(constraint.item) {
            return Err(LayoutError::UnknownView(constraint.item));
        }
        if !constraint.multiplier.is_finite() || !constraint.constant.is_finite() {
            return Err(LayoutError::NonFinite);
        }
        let incompatible = || {
            LayoutError::IncompatibleAttributes(constraint.attribute, constraint.target_attribute)
        };
        if constraint.attribute == Attribute::NotAnAttribute {
            return Err(incompatible());
        }

        match constraint.target {
            None => {
                if !constraint.attribute.is_size() {
                    return Err(LayoutError::MissingTarget(constraint.attribute));
                }
                if constraint.target_attribute != Attribute::NotAnAttribute {
                    return Err(incompatible());
                }
            }
            Some(target) => {
                if !self.tree.contains(target) {
                    return Err(LayoutError::UnknownView(target));
                }
                let item_size = constraint.attribute.is_size();
                let target_size = constraint.target_attribute.is_size();
                let compatible = match (item_size, target_size) {
                    (true, true) => true,
                    (false, false) => {
                        constraint.target_attribute.axis().is_some()
                            && constraint.attribute.axis() == constraint.target_attribute.axis()
                    }
                    _ => false,
                };
                if !compatible {
                    return Err(incompatible());
                }
                if self.tree.common_ancestor(constraint.item, target).is_none() {
                    return Err(LayoutError::NoCommonAncestor(constraint.item, target));
                }
            }
        }
        Ok(())
    }

    /// Run a layout pass only if something changed since the last one
    pub fn layout_if_needed(&mut self) -> bool {
        if !self.needs_layout {
            return false;
        }
        self.layout();
        true
    }

    /// Resolve every installed constraint and write the resulting frames
    pub fn layout(&mut self) -> &LayoutReport {
        let vars: Vec<ViewVars> = self.tree.views().map(|_| ViewVars::new()).collect();
        let mut solver = Solver::new();
        let mut report = LayoutReport::default();

        for pin in self.root_pins(&vars) {
            if let Err(e) = solver.add_constraint(pin) {
                tracing::warn!("Could not pin the root view: {:?}", e);
            }
        }

        for (index, constraint) in self.constraints.iter().enumerate() {
            let id = ConstraintId(index);
            if self.constraints[..index]
                .iter()
                .any(|earlier| earlier.restates(constraint))
            {
                report.redundant.push(id);
                continue;
            }
            if let Err(e) = solver.add_constraint(self.solver_constraint(constraint, &vars)) {
                tracing::warn!(
                    "Unable to satisfy constraint {:?} ({:?}.{:?} {:?} {} * {:?}.{:?} + {}): {:?}; skipping it",
                    id,
                    constraint.item,
                    constraint.attribute,
                    constraint.relation,
                    constraint.multiplier,
                    constraint.target,
                    constraint.target_attribute,
                    constraint.constant,
                    e
                );
                report.conflicts.push(id);
            }
        }

        for intrinsic in self.intrinsic_sizes(&vars) {
            if let Err(e) = solver.add_constraint(intrinsic) {
                tracing::warn!("Could not add intrinsic size: {:?}", e);
            }
        }

        let stays = self.stays(&vars);
        for stay in &stays {
            if let Err(e) = solver.add_edit_variable(stay.variable, stay.strength) {
                tracing::warn!("Could not hold a value at {}: {:?}", stay.value, e);
            }
        }
        suggest(&mut solver, &stays, 0.0);
        let solved = read(&solver, &vars);

        // Anything that follows a nudge of every stay is held by its stays alone
        suggest(&mut solver, &stays, NUDGE);
        let nudged = read(&solver, &vars);
        let root = self.tree.root();
        report.ambiguous = self
            .tree
            .views()
            .map(|v| v.id)
            .filter(|id| *id != root && moved(&solved[id.0].frame, &nudged[id.0].frame))
            .collect();
        if !report.ambiguous.is_empty() {
            tracing::debug!(
                "Layout is ambiguous for {:?}; keeping their current frames",
                report.ambiguous
            );
        }

        self.apply(&solved);
        self.needs_layout = false;
        self.last_report = report;
        &self.last_report
    }

    fn root_pins(&self, vars: &[ViewVars]) -> Vec<SolverConstraint> {
        let root = self.tree.root();
        let frame = self.tree.frame(root).unwrap_or_default();
        let root_vars = vars[root.0];
        [
            (root_vars.x, 0.0),
            (root_vars.y, 0.0),
            (root_vars.width, frame.width),
            (root_vars.height, frame.height),
        ]
        .into_iter()
        .map(|(variable, value)| {
            SolverConstraint::new(
                expr(vec![Term { variable, coefficient: 1.0 }], -value),
                RelationalOperator::Equal,
                REQUIRED,
            )
        })
        .collect()
    }

    /// `item.attr - multiplier * target.attr - constant (relation) 0`, in the
    /// nearest common ancestor's coordinate space
    fn solver_constraint(&self, constraint: &Constraint, vars: &[ViewVars]) -> SolverConstraint {
        let space = match constraint.target {
            Some(target) => self
                .tree
                .common_ancestor(constraint.item, target)
                .unwrap_or_else(|| self.tree.root()),
            None => constraint.item,
        };

        let mut expression = self.attribute_expr(vars, constraint.item, constraint.attribute, space);
        if let Some(target) = constraint.target {
            let target = self.attribute_expr(vars, target, constraint.target_attribute, space);
            expression.terms.extend(
                target
                    .terms
                    .into_iter()
                    .map(|t| Term { variable: t.variable, coefficient: -constraint.multiplier * t.coefficient }),
            );
            expression.constant -= constraint.multiplier * target.constant;
        }
        expression.constant -= constraint.constant;

        SolverConstraint::new(expression, operator(constraint.relation), REQUIRED)
    }

    /// Express an attribute of `view` in the coordinate space of `space`,
    /// which must be `view` itself or one of its ancestors.
    fn attribute_expr(&self, vars: &[ViewVars], view: ViewId, attribute: Attribute, space: ViewId) -> Expression {
        let own = vars[view.0];

        if view == space {
            // Edges of the container itself; a scroll view exposes its content area
            let is_scroll = self.tree.get(view).is_some_and(|v| v.is_scroll());
            let (extent_x, extent_y) = if is_scroll {
                (own.content_width, own.content_height)
            } else {
                (own.width, own.height)
            };
            let terms = match attribute {
                Attribute::Left | Attribute::Leading | Attribute::Top | Attribute::NotAnAttribute => {
                    Vec::new()
                }
                Attribute::Right | Attribute::Trailing => vec![Term { variable: extent_x, coefficient: 1.0 }],
                Attribute::Bottom => vec![Term { variable: extent_y, coefficient: 1.0 }],
                Attribute::CenterX => vec![Term { variable: extent_x, coefficient: 0.5 }],
                Attribute::CenterY => vec![Term { variable: extent_y, coefficient: 0.5 }],
                Attribute::Width => vec![Term { variable: own.width, coefficient: 1.0 }],
                Attribute::Height => vec![Term { variable: own.height, coefficient: 1.0 }],
            };
            return expr(terms, 0.0);
        }

        // Origin in `space` is the sum of origins up the chain; offsets are presentation only
        let mut origin_x = Vec::new();
        let mut origin_y = Vec::new();
        let mut current = Some(view);
        while let Some(id) = current.filter(|id| *id != space) {
            origin_x.push(Term { variable: vars[id.0].x, coefficient: 1.0 });
            origin_y.push(Term { variable: vars[id.0].y, coefficient: 1.0 });
            current = self.tree.get(id).and_then(|v| v.parent);
        }

        let terms = match attribute {
            Attribute::Left | Attribute::Leading => origin_x,
            Attribute::Right | Attribute::Trailing => {
                origin_x.push(Term { variable: own.width, coefficient: 1.0 });
                origin_x
            }
            Attribute::CenterX => {
                origin_x.push(Term { variable: own.width, coefficient: 0.5 });
                origin_x
            }
            Attribute::Top => origin_y,
            Attribute::Bottom => {
                origin_y.push(Term { variable: own.height, coefficient: 1.0 });
                origin_y
            }
            Attribute::CenterY => {
                origin_y.push(Term { variable: own.height, coefficient: 0.5 });
                origin_y
            }
            Attribute::Width => vec![Term { variable: own.width, coefficient: 1.0 }],
            Attribute::Height => vec![Term { variable: own.height, coefficient: 1.0 }],
            Attribute::NotAnAttribute => Vec::new(),
        };
        expr(terms, 0.0)
    }

    /// Labels prefer their measured size over anything a stay would keep
    fn intrinsic_sizes(&self, vars: &[ViewVars]) -> Vec<SolverConstraint> {
        self.tree
            .views()
            .filter_map(|view| Some((vars[view.id.0], view.intrinsic_size?)))
            .flat_map(|(v, size)| [(v.width, size.width), (v.height, size.height)])
            .map(|(variable, value)| {
                SolverConstraint::new(
                    expr(vec![Term { variable, coefficient: 1.0 }], -value),
                    RelationalOperator::Equal,
                    STRONG,
                )
            })
            .collect()
    }

    fn stays(&self, vars: &[ViewVars]) -> Vec<Stay> {
        let root = self.tree.root();
        let mut stays = Vec::new();
        for view in self.tree.views().filter(|v| v.id != root) {
            let v = vars[view.id.0];
            let depth = self.tree.depth(view.id);
            let frame = view.frame;
            let mut hold = |variable, value, weight| {
                stays.push(Stay {
                    variable,
                    value,
                    strength: stay_strength(depth, weight),
                })
            };

            hold(v.x, frame.x, POSITION_WEIGHT);
            hold(v.y, frame.y, POSITION_WEIGHT);
            if view.intrinsic_size.is_none() {
                hold(v.width, frame.width, SIZE_WEIGHT);
                hold(v.height, frame.height, SIZE_WEIGHT);
            }
            if let Some(state) = view.scroll() {
                hold(v.content_width, state.content_size.width, CONTENT_WEIGHT);
                hold(v.content_height, state.content_size.height, CONTENT_WEIGHT);
            }
        }
        stays
    }

    fn apply(&mut self, solved: &[Solved]) {
        let root = self.tree.root();
        let ids: Vec<ViewId> = self.tree.views().map(|v| v.id).filter(|id| *id != root).collect();
        for id in ids {
            let Solved { frame, content_size } = solved[id.0];
            let frame = Rect::new(snap(frame.x), snap(frame.y), snap(frame.width), snap(frame.height));
            let content_size = Size::new(snap(content_size.width), snap(content_size.height));
            self.tree.apply_solution(id, frame, content_size);
        }
    }
}

fn suggest(solver: &mut Solver, stays: &[Stay], shift: f64) {
    for stay in stays {
        if let Err(e) = solver.suggest_value(stay.variable, stay.value + shift) {
            tracing::warn!("Could not move a held value to {}: {:?}", stay.value + shift, e);
        }
    }
}
