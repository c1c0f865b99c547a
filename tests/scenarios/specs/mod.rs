mod ambient;
mod explicit;
