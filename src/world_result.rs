use justerror::Error;

pub type EcsResult<T = ()> = Result<T, EcsError>;

#[Error]
#[derive(Eq, PartialEq)]
pub enum EcsError {
    Component(#[from] ComponentError),
    IllegalFilter(#[from] IllegalFilterError),
}

#[Error]
#[derive(Eq, PartialEq)]
pub enum ComponentError {
    AlreadyPresent,
    Missing,
    MissingCleanup,
    MultipleNotRemovable,
}

#[Error]
#[derive(Eq, PartialEq)]
pub enum IllegalFilterError {
    SingletonNotIterable,
    TooManyMultipleKinds,
}
