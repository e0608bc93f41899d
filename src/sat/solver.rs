use log::trace;

use crate::cnf::{Cnf, Lit};

use super::{LBool, Literal, Var, heap::VarHeap};

/// Conflicts allowed before the first restart, scaled by the Luby sequence afterwards.
const RESTART_BASE: f64 = 100.0;
const VAR_DECAY: f64 = 0.95;
const CLAUSE_DECAY: f64 = 0.999;
const RESCALE_LIMIT: f64 = 1e100;
const MIN_LEARNTS: usize = 2000;

/// Outcome of [`Solver::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    Sat,
    Unsat,
    /// The conflict budget was exhausted.
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub restarts: u64,
    pub learnts: u64,
    /// Learnt clauses removed by the periodic reduction.
    pub removed: u64,
}

type ClauseRef = usize;

#[derive(Debug, Clone)]
struct SatClause {
    lits: Vec<Literal>,
    learnt: bool,
    lbd: u32,
    activity: f64,
    deleted: bool,
}

#[derive(Debug, Clone, Copy)]
struct Watcher {
    cref: ClauseRef,
    /// Some other literal of the clause: if it is true, the clause need not be visited.
    blocker: Literal,
}

fn lit_value(assigns: &[LBool], lit: Literal) -> LBool {
    assigns[lit.var() as usize].xor(lit.is_negated())
}

/// `luby(y, x)` is `y` to the power of the `x`-th term of the Luby sequence 1 1 2 1 1 2 4 ...
fn luby(y: f64, mut x: u32) -> f64 {
    let (mut size, mut seq) = (1u32, 0i32);
    while size < x + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != x {
        size = (size - 1) >> 1;
        seq -= 1;
        x %= size;
    }
    y.powi(seq)
}

/// A CDCL solver. Clauses are added at decision level 0, then [`Solver::solve`] may be called.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    clauses: Vec<SatClause>,
    learnts: Vec<ClauseRef>,
    /// `watches[l]` holds the clauses watching `!l`, visited when `l` becomes true.
    watches: Vec<Vec<Watcher>>,
    assigns: Vec<LBool>,
    level: Vec<u32>,
    reason: Vec<Option<ClauseRef>>,
    trail: Vec<Literal>,
    trail_lim: Vec<usize>,
    qhead: usize,
    activity: Vec<f64>,
    var_inc: f64,
    cla_inc: f64,
    heap: VarHeap,
    /// Saved phase: `true` when the variable was last assigned false.
    polarity: Vec<bool>,
    seen: Vec<bool>,
    max_learnts: usize,
    /// Set to false once the clauses are known to be unsatisfiable.
    ok: bool,
    model: Vec<LBool>,
    stats: SolverStats,
}

impl Solver {
    pub fn new() -> Self {
        Solver {
            var_inc: 1.0,
            cla_inc: 1.0,
            max_learnts: MIN_LEARNTS,
            ok: true,
            ..Default::default()
        }
    }

    /// Loads every clause of a CNF into a new solver.
    pub fn from_cnf(cnf: &Cnf) -> Self {
        let mut solver = Solver::new();
        solver.reserve_vars(cnf.num_vars());
        for clause in cnf.clauses() {
            if !solver.add_clause(clause.lits()) {
                break;
            }
        }
        solver.max_learnts = (solver.clauses.len() / 3).max(MIN_LEARNTS);
        solver
    }

    pub fn num_vars(&self) -> usize {
        self.assigns.len()
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.iter().filter(|c| !c.learnt && !c.deleted).count()
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    fn reserve_vars(&mut self, vars: usize) {
        while self.assigns.len() < vars {
            let v = self.assigns.len() as Var;
            self.assigns.push(LBool::Undef);
            self.level.push(0);
            self.reason.push(None);
            self.activity.push(0.0);
            self.polarity.push(true);
            self.seen.push(false);
            self.watches.push(Vec::new());
            self.watches.push(Vec::new());
            self.heap.insert(v, &self.activity);
        }
    }

    fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    fn lit_val(&self, lit: Literal) -> LBool {
        lit_value(&self.assigns, lit)
    }

    /// Adds a problem clause. Returns false if the solver became trivially unsatisfiable.
    pub fn add_clause(&mut self, lits: &[Lit]) -> bool {
        if !self.ok {
            return false;
        }
        self.cancel_until(0);
        let mut lits: Vec<Literal> = lits.iter().map(|&l| Literal::from(l)).collect();
        if let Some(max) = lits.iter().map(|l| l.var() as usize + 1).max() {
            self.reserve_vars(max);
        }
        lits.sort_unstable();
        lits.dedup();
        // x | !x is always satisfied, and sorted literals place them side by side
        if lits.windows(2).any(|w| w[0] == !w[1]) {
            return true;
        }
        if lits.iter().any(|&l| self.lit_val(l) == LBool::True) {
            return true;
        }
        lits.retain(|&l| self.lit_val(l) != LBool::False);

        match lits.len() {
            0 => {
                self.ok = false;
                false
            }
            1 => {
                self.enqueue(lits[0], None);
                if self.propagate().is_some() {
                    self.ok = false;
                }
                self.ok
            }
            _ => {
                self.push_clause(lits, false, 0);
                true
            }
        }
    }

    fn push_clause(&mut self, lits: Vec<Literal>, learnt: bool, lbd: u32) -> ClauseRef {
        let cref = self.clauses.len();
        self.watches[(!lits[0]).index()].push(Watcher {
            cref,
            blocker: lits[1],
        });
        self.watches[(!lits[1]).index()].push(Watcher {
            cref,
            blocker: lits[0],
        });
        self.clauses.push(SatClause {
            lits,
            learnt,
            lbd,
            activity: 0.0,
            deleted: false,
        });
        cref
    }

    fn enqueue(&mut self, lit: Literal, reason: Option<ClauseRef>) {
        let v = lit.var() as usize;
        self.assigns[v] = LBool::from_bool(!lit.is_negated());
        self.level[v] = self.decision_level();
        self.reason[v] = reason;
        self.trail.push(lit);
    }

    /// Unit propagation. Returns the conflicting clause, if any.
    fn propagate(&mut self) -> Option<ClauseRef> {
        let mut conflict = None;
        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            self.stats.propagations += 1;
            let false_lit = !p;

            let mut ws = std::mem::take(&mut self.watches[p.index()]);
            let (mut i, mut j) = (0, 0);
            'watchers: while i < ws.len() {
                let w = ws[i];
                i += 1;
                if lit_value(&self.assigns, w.blocker) == LBool::True {
                    ws[j] = w;
                    j += 1;
                    continue;
                }

                let clause = &mut self.clauses[w.cref];
                if clause.lits[0] == false_lit {
                    clause.lits.swap(0, 1);
                }
                let first = clause.lits[0];
                let watcher = Watcher {
                    cref: w.cref,
                    blocker: first,
                };
                if first != w.blocker && lit_value(&self.assigns, first) == LBool::True {
                    ws[j] = watcher;
                    j += 1;
                    continue;
                }

                for k in 2..clause.lits.len() {
                    if lit_value(&self.assigns, clause.lits[k]) != LBool::False {
                        clause.lits.swap(1, k);
                        self.watches[(!clause.lits[1]).index()].push(watcher);
                        continue 'watchers;
                    }
                }

                ws[j] = watcher;
                j += 1;
                if lit_value(&self.assigns, first) == LBool::False {
                    conflict = Some(w.cref);
                    self.qhead = self.trail.len();
                    while i < ws.len() {
                        ws[j] = ws[i];
                        i += 1;
                        j += 1;
                    }
                } else {
                    self.enqueue(first, Some(w.cref));
                }
            }
            ws.truncate(j);
            self.watches[p.index()] = ws;
            if conflict.is_some() {
                break;
            }
        }
        conflict
    }

    fn bump_var(&mut self, v: Var) {
        self.activity[v as usize] += self.var_inc;
        if self.activity[v as usize] > RESCALE_LIMIT {
            for a in &mut self.activity {
                *a /= RESCALE_LIMIT;
            }
            self.var_inc /= RESCALE_LIMIT;
        }
        self.heap.increase(v, &self.activity);
    }

    fn bump_clause(&mut self, cref: ClauseRef) {
        self.clauses[cref].activity += self.cla_inc;
        if self.clauses[cref].activity > RESCALE_LIMIT {
            for &l in &self.learnts {
                self.clauses[l].activity /= RESCALE_LIMIT;
            }
            self.cla_inc /= RESCALE_LIMIT;
        }
    }

    /// First UIP conflict analysis.
    /// Returns the learnt clause (asserting literal first), the backtrack level and its LBD.
    fn analyze(&mut self, mut confl: ClauseRef) -> (Vec<Literal>, u32, u32) {
        let mut learnt = vec![Literal::new(0, false)];
        let mut path = 0;
        let mut p: Option<Literal> = None;
        let mut index = self.trail.len();
        let current = self.decision_level();

        loop {
            if self.clauses[confl].learnt {
                self.bump_clause(confl);
            }
            let skip = usize::from(p.is_some());
            for k in skip..self.clauses[confl].lits.len() {
                let q = self.clauses[confl].lits[k];
                let v = q.var() as usize;
                if !self.seen[v] && self.level[v] > 0 {
                    self.bump_var(q.var());
                    self.seen[v] = true;
                    if self.level[v] >= current {
                        path += 1;
                    } else {
                        learnt.push(q);
                    }
                }
            }
            // next literal of the current level to look at
            loop {
                index -= 1;
                if self.seen[self.trail[index].var() as usize] {
                    break;
                }
            }
            let lit = self.trail[index];
            p = Some(lit);
            self.seen[lit.var() as usize] = false;
            path -= 1;
            if path == 0 {
                learnt[0] = !lit;
                break;
            }
            match self.reason[lit.var() as usize] {
                Some(r) => confl = r,
                None => {
                    learnt[0] = !lit;
                    break;
                }
            }
        }

        // Local minimization: drop literals implied by other literals of the clause.
        let to_clear = learnt.clone();
        let mut kept = vec![learnt[0]];
        for &lit in &learnt[1..] {
            let redundant = self.reason[lit.var() as usize].is_some_and(|r| {
                self.clauses[r].lits[1..].iter().all(|q| {
                    let v = q.var() as usize;
                    self.seen[v] || self.level[v] == 0
                })
            });
            if !redundant {
                kept.push(lit);
            }
        }
        for lit in to_clear {
            self.seen[lit.var() as usize] = false;
        }
        let mut learnt = kept;

        let backtrack = if learnt.len() == 1 {
            0
        } else {
            let mut max = 1;
            for k in 2..learnt.len() {
                if self.level[learnt[k].var() as usize] > self.level[learnt[max].var() as usize] {
                    max = k;
                }
            }
            learnt.swap(1, max);
            self.level[learnt[1].var() as usize]
        };

        let mut levels: Vec<u32> = learnt.iter().map(|l| self.level[l.var() as usize]).collect();
        levels.sort_unstable();
        levels.dedup();

        (learnt, backtrack, levels.len() as u32)
    }

    fn cancel_until(&mut self, level: u32) {
        if self.decision_level() <= level {
            return;
        }
        let start = self.trail_lim[level as usize];
        for k in (start..self.trail.len()).rev() {
            let lit = self.trail[k];
            let v = lit.var() as usize;
            self.assigns[v] = LBool::Undef;
            self.reason[v] = None;
            self.polarity[v] = lit.is_negated();
            self.heap.insert(lit.var(), &self.activity);
        }
        self.trail.truncate(start);
        self.qhead = start;
        self.trail_lim.truncate(level as usize);
    }

    fn pick_branch(&mut self) -> Option<Literal> {
        while let Some(v) = self.heap.pop(&self.activity) {
            if self.assigns[v as usize] == LBool::Undef {
                return Some(Literal::new(v, self.polarity[v as usize]));
            }
        }
        None
    }

    fn is_locked(&self, cref: ClauseRef) -> bool {
        let first = self.clauses[cref].lits[0];
        self.reason[first.var() as usize] == Some(cref) && self.lit_val(first) == LBool::True
    }

    /// Removes about half of the learnt clauses, keeping the glue clauses (LBD <= 2),
    /// the clauses currently used as reasons, and the most active ones.
    fn reduce_db(&mut self) {
        let mut learnts = std::mem::take(&mut self.learnts);
        learnts.sort_by(|&a, &b| {
            let (ca, cb) = (&self.clauses[a], &self.clauses[b]);
            cb.lbd
                .cmp(&ca.lbd)
                .then(ca.activity.total_cmp(&cb.activity))
        });
        let target = learnts.len() / 2;
        let mut removed = 0;
        for &cref in &learnts {
            if removed >= target {
                break;
            }
            if self.clauses[cref].lbd > 2 && !self.is_locked(cref) {
                let clause = &mut self.clauses[cref];
                clause.deleted = true;
                clause.lits = Vec::new();
                removed += 1;
            }
        }
        learnts.retain(|&c| !self.clauses[c].deleted);
        self.learnts = learnts;
        for ws in &mut self.watches {
            ws.retain(|w| !self.clauses[w.cref].deleted);
        }
        self.stats.removed += removed as u64;
    }

    /// Runs until a model is found, unsatisfiability is proved, `budget` conflicts happened
    /// (returns [`None`] to ask for a restart), or the overall limit is exceeded.
    fn search(&mut self, budget: u64, start: u64, limit: Option<u64>) -> Option<SolveResult> {
        let mut conflicts = 0;
        loop {
            if let Some(confl) = self.propagate() {
                self.stats.conflicts += 1;
                conflicts += 1;
                if self.decision_level() == 0 {
                    self.ok = false;
                    return Some(SolveResult::Unsat);
                }
                let (learnt, backtrack, lbd) = self.analyze(confl);
                self.cancel_until(backtrack);
                if learnt.len() == 1 {
                    self.enqueue(learnt[0], None);
                } else {
                    let asserting = learnt[0];
                    let cref = self.push_clause(learnt, true, lbd);
                    self.learnts.push(cref);
                    self.bump_clause(cref);
                    self.enqueue(asserting, Some(cref));
                }
                self.stats.learnts += 1;
                self.var_inc /= VAR_DECAY;
                self.cla_inc /= CLAUSE_DECAY;

                if limit.is_some_and(|limit| self.stats.conflicts - start > limit) {
                    return Some(SolveResult::Unknown);
                }
            } else {
                if conflicts >= budget {
                    self.cancel_until(0);
                    return None;
                }
                if self.learnts.len() >= self.max_learnts + self.trail.len() {
                    self.reduce_db();
                    self.max_learnts += self.max_learnts / 10;
                }
                match self.pick_branch() {
                    None => {
                        self.model = self.assigns.clone();
                        return Some(SolveResult::Sat);
                    }
                    Some(lit) => {
                        self.stats.decisions += 1;
                        self.trail_lim.push(self.trail.len());
                        self.enqueue(lit, None);
                    }
                }
            }
        }
    }

    /// Solves the clauses added so far.
    ///
    /// `conflict_limit` bounds the number of conflicts of this call: once it is exceeded,
    /// [`SolveResult::Unknown`] is returned. [`None`] means unbounded, `Some(0)` gives up
    /// at the first conflict that is not at the root level.
    pub fn solve(&mut self, conflict_limit: Option<u64>) -> SolveResult {
        self.model.clear();
        if !self.ok {
            return SolveResult::Unsat;
        }
        let start = self.stats.conflicts;
        let mut restarts = 0;
        let result = loop {
            let budget = (luby(2.0, restarts) * RESTART_BASE) as u64;
            match self.search(budget, start, conflict_limit) {
                Some(result) => break result,
                None => {
                    restarts += 1;
                    self.stats.restarts += 1;
                    trace!(
                        "restart #{} after {} conflicts ({} learnt clauses)",
                        self.stats.restarts,
                        self.stats.conflicts - start,
                        self.learnts.len()
                    );
                }
            }
        };
        self.cancel_until(0);
        result
    }

    /// Value of a literal in the model found by the last call to [`Solver::solve`],
    /// [`None`] if there is no model or the variable is unknown.
    pub fn value(&self, lit: Lit) -> Option<bool> {
        let lit = Literal::from(lit);
        match self.model.get(lit.var() as usize)?.xor(lit.is_negated()) {
            LBool::True => Some(true),
            LBool::False => Some(false),
            LBool::Undef => None,
        }
    }
}
