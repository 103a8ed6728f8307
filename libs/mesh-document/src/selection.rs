//! # Selection
//!
//! Per-element selection flags on a mesh document. Selecting can pull in
//! the constituent vertices and edges of an element (`subparts`) and
//! promote edges and faces whose vertices all end up selected
//! (`supparts`). Every change bumps the document version.

use crate::document::MeshDocument;
use crate::element::{EdgeId, FaceId, MeshElement, VertId};
use std::collections::BTreeSet;

impl MeshDocument {
    /// Sets one element's selection flag. Dead handles are ignored.
    pub fn set_selected(&mut self, elem: MeshElement, selected: bool) {
        let flag = match elem {
            MeshElement::Vert(v) => self.vert_mut(v).map(|vert| &mut vert.selected),
            MeshElement::Edge(e) => self.edge_mut(e).map(|edge| &mut edge.selected),
            MeshElement::Face(f) => self.face_mut(f).map(|face| &mut face.selected),
        };
        if let Some(flag) = flag {
            *flag = selected;
            self.dirty();
        }
    }

    /// Selects `elements`.
    ///
    /// - `only`: clear the whole selection first.
    /// - `subparts`: an edge also selects its vertices; a face its vertices
    ///   and edges.
    /// - `supparts`: every selected vertex promotes its incident edges and
    ///   faces whose vertices are all selected.
    pub fn select(&mut self, elements: &[MeshElement], subparts: bool, supparts: bool, only: bool) {
        if only {
            self.clear_flags(false);
        }

        let mut chosen: BTreeSet<MeshElement> = BTreeSet::new();
        for &elem in elements.iter().filter(|&&e| self.is_valid(e)) {
            chosen.insert(elem);
            if !subparts {
                continue;
            }
            match elem {
                MeshElement::Vert(_) => {}
                MeshElement::Edge(_) => {
                    chosen.extend(self.verts_of(elem).into_iter().map(MeshElement::Vert));
                }
                MeshElement::Face(f) => {
                    chosen.extend(self.verts_of(elem).into_iter().map(MeshElement::Vert));
                    if let Some(face) = self.face(f) {
                        chosen.extend(face.edges.iter().copied().map(MeshElement::Edge));
                    }
                }
            }
        }

        for &elem in &chosen {
            self.set_flag(elem, true);
        }

        if supparts {
            let verts = chosen.iter().filter_map(|elem| match elem {
                MeshElement::Vert(v) => Some(*v),
                _ => None,
            });
            let mut promoted = Vec::new();
            for v in verts {
                let Some(vert) = self.vert(v) else { continue };
                for &e in &vert.edges {
                    if self.verts_of(MeshElement::Edge(e)).iter().all(|&u| self.is_selected(u.into())) {
                        promoted.push(MeshElement::Edge(e));
                    }
                }
                for f in self.vert_faces(v) {
                    if self.verts_of(MeshElement::Face(f)).iter().all(|&u| self.is_selected(u.into())) {
                        promoted.push(MeshElement::Face(f));
                    }
                }
            }
            for elem in promoted {
                self.set_flag(elem, true);
            }
        }

        self.dirty();
    }

    /// Clears the selection flag of `elements`.
    pub fn deselect(&mut self, elements: &[MeshElement]) {
        for &elem in elements {
            self.set_flag(elem, false);
        }
        self.dirty();
    }

    /// Clears every selection flag.
    pub fn deselect_all(&mut self) {
        self.clear_flags(false);
        self.dirty();
    }

    /// Selects every live element.
    pub fn select_all(&mut self) {
        self.clear_flags(true);
        self.dirty();
    }

    /// Deselects everything when anything is selected, otherwise selects
    /// everything.
    pub fn select_toggle(&mut self) {
        let any = self.verts().any(|(_, v)| v.selected)
            || self.edges().any(|(_, e)| e.selected)
            || self.faces().any(|(_, f)| f.selected);
        if any {
            self.deselect_all();
        } else {
            self.select_all();
        }
    }

    /// Selected vertices in handle order.
    pub fn get_selected_verts(&self) -> Vec<VertId> {
        self.verts().filter(|(_, v)| v.selected).map(|(id, _)| id).collect()
    }

    /// Selected edges in handle order.
    pub fn get_selected_edges(&self) -> Vec<EdgeId> {
        self.edges().filter(|(_, e)| e.selected).map(|(id, _)| id).collect()
    }

    /// Selected faces in handle order.
    pub fn get_selected_faces(&self) -> Vec<FaceId> {
        self.faces().filter(|(_, f)| f.selected).map(|(id, _)| id).collect()
    }

    fn set_flag(&mut self, elem: MeshElement, selected: bool) {
        match elem {
            MeshElement::Vert(v) => {
                if let Some(vert) = self.vert_mut(v) {
                    vert.selected = selected;
                }
            }
            MeshElement::Edge(e) => {
                if let Some(edge) = self.edge_mut(e) {
                    edge.selected = selected;
                }
            }
            MeshElement::Face(f) => {
                if let Some(face) = self.face_mut(f) {
                    face.selected = selected;
                }
            }
        }
    }

    /// Sets every flag without bumping the version.
    fn clear_flags(&mut self, selected: bool) {
        for vert in self.verts.iter_mut().flatten() {
            vert.selected = selected;
        }
        for edge in self.edges.iter_mut().flatten() {
            edge.selected = selected;
        }
        for face in self.faces.iter_mut().flatten() {
            face.selected = selected;
        }
    }
}
