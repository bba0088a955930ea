/// Items of `aa` that match something in `bb`, in the order of `aa`
pub fn dumb_intersection_by<A, B, F>(aa: &[A], bb: &[B], eq: F) -> Vec<A>
where
    A: Clone,
    F: Fn(&A, &B) -> bool,
{
    let mut res = Vec::with_capacity(aa.len().min(bb.len()));
    for a in aa.iter() {
        if bb.iter().any(|b| eq(a, b)) { res.push(a.clone()) }
    }
    res
}
