use crate::geometry::Rect;

/// MAXRECTS free-list with best-short-side-fit placement.
///
/// The free region starts past the left/top margin and runs to the sheet
/// edge; the caller turns that margin into a symmetric border. Candidate
/// positions are ranked by (short side fit, long side fit), a non-rotated
/// candidate wins a score tie, then smaller y, then smaller x, so packing
/// is deterministic.
pub(super) struct MaxRects {
    free: Vec<Rect>,
}

impl MaxRects {
    pub fn new(width: i32, height: i32, padding: i32) -> Self {
        let region = Rect::new(
            padding,
            padding,
            (width - padding).max(0),
            (height - padding).max(0),
        );
        Self { free: vec![region] }
    }

    /// Places a `w` x `h` rectangle, returning its position and whether it
    /// was rotated, or `None` when no free rect can hold it.
    pub fn insert(&mut self, w: i32, h: i32, allow_rotate: bool) -> Option<(i32, i32, bool)> {
        let (node, rotated) = self.find_position(w, h, allow_rotate)?;
        self.place(&node);
        Some((node.x, node.y, rotated))
    }

    fn find_position(&self, w: i32, h: i32, allow_rotate: bool) -> Option<(Rect, bool)> {
        let mut best: Option<((i64, i64, bool, i32, i32), Rect)> = None;
        for fr in &self.free {
            let mut consider = |cw: i32, ch: i32, rotated: bool| {
                if fr.w < cw || fr.h < ch {
                    return;
                }
                let leftover_w = (fr.w - cw) as i64;
                let leftover_h = (fr.h - ch) as i64;
                let short_fit = leftover_w.min(leftover_h);
                let long_fit = leftover_w.max(leftover_h);
                let key = (short_fit, long_fit, rotated, fr.y, fr.x);
                if best.as_ref().map_or(true, |(bk, _)| key < *bk) {
                    best = Some((key, Rect::new(fr.x, fr.y, cw, ch)));
                }
            };
            consider(w, h, false);
            if allow_rotate {
                consider(h, w, true);
            }
        }
        best.map(|(key, node)| (node, key.2))
    }

    fn place(&mut self, node: &Rect) {
        let mut new_free: Vec<Rect> = Vec::with_capacity(self.free.len() + 4);
        for fr in &self.free {
            if !fr.overlaps(node) {
                new_free.push(*fr);
                continue;
            }
            // above
            if node.y > fr.y {
                new_free.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
            }
            // below
            if node.y1() < fr.y1() {
                new_free.push(Rect::new(fr.x, node.y1(), fr.w, fr.y1() - node.y1()));
            }
            // left and right strips within the overlap band
            let band_y = fr.y.max(node.y);
            let band_h = fr.y1().min(node.y1()) - band_y;
            if band_h > 0 {
                if node.x > fr.x {
                    new_free.push(Rect::new(fr.x, band_y, node.x - fr.x, band_h));
                }
                if node.x1() < fr.x1() {
                    new_free.push(Rect::new(node.x1(), band_y, fr.x1() - node.x1(), band_h));
                }
            }
        }
        self.free = new_free;
        self.prune_free_list();
    }

    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut removed = false;
            let mut j = i + 1;
            while j < self.free.len() {
                let a = self.free[i];
                let b = self.free[j];
                if b.contains(&a) {
                    self.free.remove(i);
                    removed = true;
                    break;
                }
                if a.contains(&b) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if !removed {
                i += 1;
            }
        }
    }
}
