use dyntrait::{dyn_trait, method, table, DispatchTable, Implements, Receiver, Shared, TraitObject};
use serial_test::serial;

method! {
    pub struct Id(&self) -> u32;
}

dyn_trait! {
    pub trait Identified { Id }
    pub trait Contended { Id }
}

#[derive(Clone)]
struct Node(u32);

#[derive(Clone)]
struct Edge(u32, u32);

impl Implements<Id> for Node {
    fn invoke(this: Receiver<'_, Self, Shared>, _: ()) -> u32 {
        this.0
    }
}

impl Implements<Id> for Edge {
    fn invoke(this: Receiver<'_, Self, Shared>, _: ()) -> u32 {
        (this.0 << 16) | this.1
    }
}

#[test]
#[serial]
fn builds_once_per_pair() {
    let before = table::registered();
    let a = TraitObject::<Identified>::new(Node(1));
    assert_eq!(table::registered(), before + 1);
    let b = TraitObject::<Identified>::new(Node(2));
    assert_eq!(table::registered(), before + 1);
    let c = TraitObject::<Identified>::new(Edge(1, 2));
    assert_eq!(table::registered(), before + 2);

    assert!(std::ptr::eq(a.table(), b.table()));
    assert_eq!(c.call::<Id>(()), 0x0001_0002);
    assert_eq!(b.call::<Id>(()), 2);
}

#[test]
#[serial]
fn concurrent_first_use() {
    let before = table::registered();
    let threads: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                DispatchTable::of::<Contended, Node>() as *const DispatchTable as usize
            })
        })
        .collect();
    let tables: Vec<usize> = threads.into_iter().map(|t| t.join().unwrap()).collect();

    assert_eq!(table::registered(), before + 1);
    assert!(tables.windows(2).all(|w| w[0] == w[1]));
    let table = DispatchTable::of::<Contended, Node>();
    assert_eq!(tables[0], table as *const DispatchTable as usize);
    assert!(format!("{:?}", table).contains("Contended"));
}
