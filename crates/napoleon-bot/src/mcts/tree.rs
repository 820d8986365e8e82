//! Arena-allocated UCT tree for a single determinized world.

use napoleon_core::model::card::Card;
use napoleon_core::model::player::Seat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    /// Card played to reach this node and the seat that played it.
    pub action: Option<(Seat, Card)>,
    pub children: Vec<NodeId>,
    pub untried: Vec<Card>,
    pub visits: u32,
    /// Sum of rewards from the perspective of the seat in `action`.
    pub value_sum: f64,
}

impl Node {
    fn new(parent: Option<NodeId>, action: Option<(Seat, Card)>, untried: Vec<Card>) -> Self {
        Self {
            parent,
            action,
            children: Vec::new(),
            untried,
            visits: 0,
            value_sum: 0.0,
        }
    }

    pub fn mean_value(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f64
        }
    }

    fn uct_score(&self, ln_parent_visits: f64, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        self.mean_value() + exploration * (ln_parent_visits / self.visits as f64).sqrt()
    }
}

#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<Node>,
}

impl SearchTree {
    pub fn new(root_moves: Vec<Card>) -> Self {
        Self {
            nodes: vec![Node::new(None, None, root_moves)],
        }
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_child(
        &mut self,
        parent: NodeId,
        seat: Seat,
        card: Card,
        untried: Vec<Card>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes
            .push(Node::new(Some(parent), Some((seat, card)), untried));
        let parent = self.get_mut(parent);
        parent.children.push(id);
        parent.untried.retain(|candidate| *candidate != card);
        id
    }

    /// Child with the best UCT score; earlier children win ties.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(id);
        let ln_visits = (node.visits.max(1) as f64).ln();
        let mut best: Option<(NodeId, f64)> = None;
        for child in &node.children {
            let score = self.get(*child).uct_score(ln_visits, exploration);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((*child, score));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Adds one visit along the path to the root, crediting each node's mover.
    pub fn backpropagate(&mut self, leaf: NodeId, rewards: &[f64; 4]) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visits += 1;
            if let Some((seat, _)) = node.action {
                node.value_sum += rewards[seat.index()];
            }
            current = node.parent;
        }
    }

    /// Visit count and mean value for each root move.
    pub fn root_stats(&self) -> Vec<(Card, u32, f64)> {
        self.get(NodeId::ROOT)
            .children
            .iter()
            .filter_map(|id| {
                let node = self.get(*id);
                node.action
                    .map(|(_, card)| (card, node.visits, node.mean_value()))
            })
            .collect()
    }
}
