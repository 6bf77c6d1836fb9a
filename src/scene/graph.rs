//! Retained scene graph with keyed reconciliation and hit testing.

use super::node::{ClipRect, Node, Paint, Point, Shape};
use std::collections::HashMap;

/// Layers in paint order; later layers sit on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Grid,
    Bars,
    XAxis,
    YAxis,
    Overview,
    Indicator,
    OverviewOverlay,
}

impl LayerId {
    pub const ALL: [LayerId; 7] = [
        LayerId::Grid,
        LayerId::Bars,
        LayerId::XAxis,
        LayerId::YAxis,
        LayerId::Overview,
        LayerId::Indicator,
        LayerId::OverviewOverlay,
    ];
}

/// Outcome of a join pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    clip: Option<ClipRect>,
    nodes: Vec<Node>,
}

impl Layer {
    fn new(id: LayerId) -> Self {
        Self {
            id,
            clip: None,
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn clip(&self) -> Option<ClipRect> {
        self.clip
    }

    pub fn set_clip(&mut self, clip: Option<ClipRect>) {
        self.clip = clip;
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key == key)
    }

    /// Reconcile the layer's nodes with `data`.
    ///
    /// Nodes whose key is still present are handed back to `render` for an
    /// in-place update, new keys get a fresh node, and nodes with keys no longer
    /// in `data` are dropped. The resulting order follows `data`.
    pub fn join<T>(
        &mut self,
        data: &[T],
        key: impl Fn(&T) -> String,
        mut render: impl FnMut(&T, &mut Node),
    ) -> JoinStats {
        let mut previous: HashMap<String, Node> = self
            .nodes
            .drain(..)
            .map(|node| (node.key.clone(), node))
            .collect();

        let mut stats = JoinStats::default();
        let mut nodes = Vec::with_capacity(data.len());
        for datum in data {
            let k = key(datum);
            let mut node = match previous.remove(&k) {
                Some(node) => {
                    stats.updated += 1;
                    node
                }
                None => {
                    stats.entered += 1;
                    Node::new(k)
                }
            };
            render(datum, &mut node);
            nodes.push(node);
        }

        stats.exited = previous.len();
        self.nodes = nodes;
        stats
    }
}

/// A shape ready to paint, already clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub shape: Shape,
    pub paint: Paint,
}

/// Addressable drawing surface, `width` x `height` chart pixels.
#[derive(Debug, Clone)]
pub struct Scene {
    width: f64,
    height: f64,
    layers: Vec<Layer>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            layers: LayerId::ALL.iter().map(|&id| Layer::new(id)).collect(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn bounds(&self) -> ClipRect {
        ClipRect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn layer(&self, id: LayerId) -> &Layer {
        // Layers are created for every id in `LayerId::ALL` order
        &self.layers[Self::slot(id)]
    }

    pub fn layer_mut(&mut self, id: LayerId) -> &mut Layer {
        &mut self.layers[Self::slot(id)]
    }

    fn slot(id: LayerId) -> usize {
        LayerId::ALL
            .iter()
            .position(|&l| l == id)
            .unwrap_or_default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn node_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    /// Topmost interactive node under `p`, with its layer.
    pub fn hit_test(&self, p: Point) -> Option<(LayerId, &Node)> {
        if !self.bounds().contains(p) {
            return None;
        }
        self.layers.iter().rev().find_map(|layer| {
            if layer.clip.is_some_and(|c| !c.contains(p)) {
                return None;
            }
            layer
                .nodes
                .iter()
                .rev()
                .find(|n| n.interactive && n.shape.contains(p))
                .map(|n| (layer.id, n))
        })
    }

    /// Visible shapes in paint order, clipped to their layer and the scene.
    pub fn render_list(&self) -> Vec<RenderItem> {
        let scene = self.bounds();
        let mut items = Vec::new();
        for layer in &self.layers {
            let clip = match layer.clip {
                Some(c) => match c.intersection(&scene) {
                    Some(c) => c,
                    None => continue,
                },
                None => scene,
            };
            for node in &layer.nodes {
                if node.paint.is_transparent() {
                    continue;
                }
                if let Some(shape) = node.shape.clipped(&clip) {
                    items.push(RenderItem {
                        shape,
                        paint: node.paint,
                    });
                }
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::node::Color;

    fn rect(x: f64) -> Shape {
        Shape::Rect {
            x,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        }
    }

    #[test]
    fn join_enters_updates_and_exits() {
        let mut scene = Scene::new(100.0, 100.0);
        let layer = scene.layer_mut(LayerId::Bars);

        let first = layer.join(&["a", "b", "c"], |s| s.to_string(), |_, n| n.shape = rect(0.0));
        assert_eq!(
            first,
            JoinStats {
                entered: 3,
                updated: 0,
                exited: 0
            }
        );

        let second = layer.join(&["c", "d"], |s| s.to_string(), |_, n| n.shape = rect(5.0));
        assert_eq!(
            second,
            JoinStats {
                entered: 1,
                updated: 1,
                exited: 2
            }
        );
        let keys: Vec<&str> = layer.nodes().iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "d"]);
        assert_eq!(layer.find("c").unwrap().shape, rect(5.0));
    }

    #[test]
    fn join_keeps_node_state_on_update() {
        let mut scene = Scene::new(100.0, 100.0);
        let layer = scene.layer_mut(LayerId::Bars);
        layer.join(&[1u32], |v| v.to_string(), |_, n| n.interactive = true);
        layer.join(&[1u32], |v| v.to_string(), |_, n| n.shape = rect(3.0));
        let node = layer.find("1").unwrap();
        assert!(node.interactive);
        assert_eq!(node.shape, rect(3.0));
    }

    #[test]
    fn hit_test_prefers_top_layer_and_respects_clip() {
        let mut scene = Scene::new(100.0, 100.0);
        scene.layer_mut(LayerId::Bars).join(&[0.0], |_| "bar".into(), |x, n| {
            n.shape = rect(*x);
            n.interactive = true;
        });
        scene
            .layer_mut(LayerId::OverviewOverlay)
            .join(&[5.0], |_| "overlay".into(), |x, n| {
                n.shape = rect(*x);
                n.paint = Paint::default().with_opacity(0.0);
                n.interactive = true;
            });

        let (layer, node) = scene.hit_test(Point::new(7.0, 5.0)).unwrap();
        assert_eq!(layer, LayerId::OverviewOverlay);
        assert_eq!(node.key, "overlay");

        let (layer, _) = scene.hit_test(Point::new(2.0, 5.0)).unwrap();
        assert_eq!(layer, LayerId::Bars);

        scene
            .layer_mut(LayerId::Bars)
            .set_clip(Some(ClipRect::new(3.0, 0.0, 100.0, 100.0)));
        assert!(scene.hit_test(Point::new(2.0, 5.0)).is_none());
    }

    #[test]
    fn render_list_skips_transparent_and_offscreen() {
        let mut scene = Scene::new(100.0, 100.0);
        scene
            .layer_mut(LayerId::Bars)
            .join(&[-50.0, 10.0, 95.0], |x| x.to_string(), |x, n| {
                n.shape = rect(*x);
                n.paint = Paint::fill(Color::BLACK);
            });
        scene
            .layer_mut(LayerId::OverviewOverlay)
            .join(&[0.0], |_| "overlay".into(), |x, n| {
                n.shape = rect(*x);
                n.paint = Paint::fill(Color::BLACK).with_opacity(0.0);
            });

        let items = scene.render_list();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1].shape,
            Shape::Rect {
                x: 95.0,
                y: 0.0,
                width: 5.0,
                height: 10.0
            }
        );
    }
}
